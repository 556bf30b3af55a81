//! Ask command handler.
//!
//! Answers one question and exits.

use super::chat::route_label;
use clap::Args;
use medqa_core::{config::AppConfig, AppError, AppResult};

/// Answer a single question
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ask command");
        tracing::debug!("Ask command options: {:?}", self);

        let engine = medqa_knowledge::build_engine(config)?;
        let answer = engine.answer(&self.query).await?;

        if self.json {
            let matched_question = answer
                .matched_index
                .and_then(|i| engine.store().get(i))
                .map(|entry| entry.question.clone());

            let output = serde_json::json!({
                "answer": answer.text,
                "route": answer.route,
                "score": answer.score,
                "matchedQuestion": matched_question,
                "candidate": answer.candidate,
                "provider": config.provider,
                "model": config.model,
            });

            let json = serde_json::to_string_pretty(&output)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            println!("{}", json);
        } else {
            println!("{}", route_label(answer.route));
            println!("{}", answer.text);
        }

        Ok(())
    }
}
