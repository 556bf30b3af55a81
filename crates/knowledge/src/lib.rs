//! Medical knowledge base and retrieval engine.
//!
//! Loads question/answer pairs from CSV, indexes the questions with TF-IDF,
//! and answers queries by refining the closest stored answer or, when
//! nothing is close enough, generating one from scratch.

pub mod conversation;
pub mod engine;
pub mod generator;
pub mod index;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use conversation::{ConversationLog, Speaker, Turn};
pub use engine::RetrievalEngine;
pub use generator::{FallbackGenerator, LlmFallbackGenerator};
pub use index::SimilarityIndex;
pub use store::KnowledgeStore;
pub use types::{Answer, KnowledgeEntry, Retrieval, Route, StoreStats};

use medqa_core::{AppConfig, AppResult};
use medqa_llm::create_client;
use medqa_prompt::list_prompts;
use std::sync::Arc;
use std::time::Duration;

/// Load the knowledge store named by `config`.
pub fn open_store(config: &AppConfig) -> AppResult<KnowledgeStore> {
    KnowledgeStore::load(&config.knowledge_path())
}

/// Assemble a ready-to-use engine from configuration.
///
/// The store is loaded before the configuration is validated, so a missing
/// knowledge base is reported ahead of a missing credential.
pub fn build_engine(config: &AppConfig) -> AppResult<RetrievalEngine> {
    let store = open_store(config)?;

    config.validate()?;

    let api_key = config.resolve_api_key();
    let client = create_client(
        &config.provider,
        config.endpoint(),
        api_key.as_deref(),
        config.timeout_secs().map(Duration::from_secs),
    )?;

    let generator = LlmFallbackGenerator::from_workspace(client, &config.model, &config.workspace)?;

    tracing::info!(
        "Engine ready: {} entries, provider {}, model {}, threshold {}",
        store.len(),
        config.provider,
        config.model,
        config.threshold
    );

    Ok(RetrievalEngine::new(store, Arc::new(generator)).with_threshold(config.threshold))
}

/// Statistics for the configured knowledge base, including the prompt
/// overrides found in the workspace.
pub fn stats(config: &AppConfig) -> AppResult<StoreStats> {
    let store = open_store(config)?;
    let index = SimilarityIndex::build(&store);

    Ok(StoreStats {
        prompt_overrides: list_prompts(&config.workspace)?,
        ..store_stats(&store, &index)
    })
}

/// Statistics for an already loaded store and its index.
pub fn store_stats(store: &KnowledgeStore, index: &SimilarityIndex) -> StoreStats {
    StoreStats {
        source: store.source().map(|p| p.to_path_buf()),
        entries: store.len(),
        vocabulary_size: index.vocabulary_size(),
        empty_questions: store
            .entries()
            .iter()
            .filter(|e| e.question.trim().is_empty())
            .count(),
        empty_answers: store
            .entries()
            .iter()
            .filter(|e| e.answer.trim().is_empty())
            .count(),
        prompt_overrides: Vec::new(),
    }
}
