//! Chat command handler.
//!
//! Line-oriented session: one query per input line, answered before the
//! next line is read.

use clap::Args;
use medqa_core::{config::AppConfig, AppError, AppResult};
use medqa_knowledge::{Answer, ConversationLog, RetrievalEngine, Route};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive question-answering session
#[derive(Args, Debug)]
pub struct ChatCommand {
    /// Write the conversation as JSON to this file on exit
    #[arg(short, long)]
    pub transcript: Option<PathBuf>,
}

/// What a line of user input asks for.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    History,
    Skip,
    Query(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Skip,
        "/quit" | "/exit" => Input::Quit,
        "/history" => Input::History,
        query => Input::Query(query),
    }
}

/// Heading printed above a bot answer.
pub fn route_label(route: Route) -> &'static str {
    match route {
        Route::Refine => "Bot (refined answer):",
        Route::Generate => "Bot (AI-generated):",
    }
}

fn render_history(log: &ConversationLog) -> String {
    if log.is_empty() {
        return "(no conversation yet)".to_string();
    }

    log.turns()
        .iter()
        .map(|turn| format!("{}: {}", turn.speaker.label(), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing chat command");

        let engine = medqa_knowledge::build_engine(config)?;
        let mut log = ConversationLog::new();

        println!("Welcome to the Medical Chatbot! Ask me anything about medical topics.");
        println!("Type /history to review the conversation, /quit to leave.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("You: ");
            std::io::stdout().flush()?;

            let Some(line) = lines.next_line().await? else {
                println!();
                break;
            };

            match parse_input(&line) {
                Input::Skip => continue,
                Input::Quit => break,
                Input::History => println!("{}", render_history(&log)),
                Input::Query(query) => ask_once(&engine, &mut log, query).await,
            }
        }

        if let Some(ref path) = self.transcript {
            log.save(path)?;
            println!("Transcript saved to {}", path.display());
        }

        tracing::info!("Chat session ended after {} turns", log.len());
        Ok(())
    }
}

/// Answer one query and print the result.
async fn ask_once(engine: &RetrievalEngine, log: &mut ConversationLog, query: &str) {
    match exchange(engine, log, query).await {
        Ok(answer) => {
            println!("{}", route_label(answer.route));
            println!("{}", answer.text);
        }
        Err(e) => eprintln!("{}", failure_message(&e)),
    }
}

/// Run one query through the engine, recording both sides of the exchange.
///
/// A failed generation keeps the user turn and adds no bot turn.
async fn exchange(
    engine: &RetrievalEngine,
    log: &mut ConversationLog,
    query: &str,
) -> AppResult<Answer> {
    log.push_user(query);
    let answer = engine.answer(query).await?;
    log.push_bot(answer.text.clone());
    Ok(answer)
}

fn failure_message(error: &AppError) -> String {
    format!("Sorry, I couldn't generate a response. Error: {}", error)
}
