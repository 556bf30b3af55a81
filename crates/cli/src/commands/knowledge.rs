//! Knowledge command handler.
//!
//! Inspects the knowledge base without calling the generation service.

use clap::{Args, Subcommand};
use medqa_core::{config::AppConfig, AppError, AppResult};
use medqa_knowledge::{open_store, stats, Route, SimilarityIndex};

/// Inspect the knowledge base
#[derive(Args, Debug)]
pub struct KnowledgeCommand {
    #[command(subcommand)]
    pub action: KnowledgeAction,
}

#[derive(Subcommand, Debug)]
pub enum KnowledgeAction {
    /// Show knowledge base statistics
    Stats(KnowledgeStatsCommand),
    /// Rank stored questions against a query
    Match(KnowledgeMatchCommand),
}

/// Show knowledge base stats
#[derive(Args, Debug)]
pub struct KnowledgeStatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeStatsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge stats command");

        let stats = stats(config)?;

        if self.json {
            let output = serde_json::json!({
                "source": stats.source,
                "entries": stats.entries,
                "vocabularySize": stats.vocabulary_size,
                "emptyQuestions": stats.empty_questions,
                "emptyAnswers": stats.empty_answers,
                "promptOverrides": stats.prompt_overrides,
                "threshold": config.threshold,
            });
            println!("{}", to_pretty(&output)?);
        } else {
            let source = stats
                .source
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(in memory)".to_string());

            println!("Knowledge base: {}", source);
            println!("  Entries: {}", stats.entries);
            println!("  Vocabulary: {} terms", stats.vocabulary_size);
            println!("  Empty questions: {}", stats.empty_questions);
            println!("  Empty answers: {}", stats.empty_answers);
            println!("  Threshold: {}", config.threshold);
            if stats.prompt_overrides.is_empty() {
                println!("  Prompt overrides: (none)");
            } else {
                println!("  Prompt overrides: {}", stats.prompt_overrides.join(", "));
            }
        }

        Ok(())
    }
}

/// Rank stored questions against a query
#[derive(Args, Debug)]
pub struct KnowledgeMatchCommand {
    /// Query text
    pub query: String,

    /// Number of matches to show
    #[arg(short = 'n', long, default_value = "5")]
    pub top: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl KnowledgeMatchCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing knowledge match command");

        let store = open_store(config)?;
        let index = SimilarityIndex::build(&store);

        let (_, best_score) = index.query(&self.query);
        let route = Route::for_score(best_score, config.threshold);
        let matches = index.top_matches(&self.query, self.top);

        if self.json {
            let ranked: Vec<serde_json::Value> = matches
                .iter()
                .filter_map(|&(row, score)| {
                    store.get(row).map(|entry| {
                        serde_json::json!({
                            "index": row,
                            "score": score,
                            "question": entry.question,
                            "answer": entry.answer,
                        })
                    })
                })
                .collect();

            let output = serde_json::json!({
                "query": self.query,
                "route": route,
                "bestScore": best_score,
                "threshold": config.threshold,
                "matches": ranked,
            });
            println!("{}", to_pretty(&output)?);
        } else {
            println!(
                "Route: {} (best score {:.3}, threshold {})",
                route.as_str(),
                best_score,
                config.threshold
            );
            for (row, score) in &matches {
                if let Some(entry) = store.get(*row) {
                    println!("  [{:>4}] {:.3}  {}", row, score, entry.question);
                }
            }
        }

        Ok(())
    }
}

impl KnowledgeCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        match &self.action {
            KnowledgeAction::Stats(cmd) => cmd.execute(config),
            KnowledgeAction::Match(cmd) => cmd.execute(config),
        }
    }
}

fn to_pretty(value: &serde_json::Value) -> AppResult<String> {
    serde_json::to_string_pretty(value).map_err(|e| AppError::Serialization(e.to_string()))
}
