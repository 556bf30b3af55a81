//! Retrieval-and-fallback decision engine.
//!
//! For each query the engine finds the closest stored question, gates on the
//! similarity threshold, and then either refines the stored answer or asks
//! the generator for a fresh one.

use crate::generator::FallbackGenerator;
use crate::index::SimilarityIndex;
use crate::store::KnowledgeStore;
use crate::types::{Answer, Retrieval, Route};
use medqa_core::config::DEFAULT_THRESHOLD;
use medqa_core::AppResult;
use std::sync::Arc;

/// Answers queries from a fixed knowledge store.
pub struct RetrievalEngine {
    store: KnowledgeStore,
    index: SimilarityIndex,
    generator: Arc<dyn FallbackGenerator>,
    threshold: f64,
}

impl RetrievalEngine {
    /// Build the similarity index over `store` and wire in `generator`.
    pub fn new(store: KnowledgeStore, generator: Arc<dyn FallbackGenerator>) -> Self {
        let index = SimilarityIndex::build(&store);

        Self {
            store,
            index,
            generator,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Override the similarity threshold. Scores must exceed it to refine.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn store(&self) -> &KnowledgeStore {
        &self.store
    }

    pub fn index(&self) -> &SimilarityIndex {
        &self.index
    }

    /// Similarity lookup and threshold gate, without calling the generator.
    pub fn lookup(&self, query: &str) -> Retrieval {
        let (best_index, score) = self.index.query(query);

        Retrieval {
            best_index,
            score,
            route: Route::for_score(score, self.threshold),
        }
    }

    /// Answer a query.
    ///
    /// A refine failure is folded into the answer text. A generate failure
    /// is returned to the caller.
    ///
    /// Routing looks only at the score. A matched row whose stored answer is
    /// empty still takes the refine path, with `""` as the candidate.
    pub async fn answer(&self, query: &str) -> AppResult<Answer> {
        let retrieval = self.lookup(query);

        tracing::info!(
            route = retrieval.route.as_str(),
            score = retrieval.score,
            index = retrieval.best_index,
            "Retrieved best match"
        );

        match retrieval.route {
            Route::Refine => {
                let candidate = self
                    .store
                    .get(retrieval.best_index)
                    .map(|entry| entry.answer.clone())
                    .unwrap_or_default();

                let text = match self.generator.refine(query, &candidate).await {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!("Refine failed, returning error text: {}", e);
                        format!("Error refining the answer: {}", e)
                    }
                };

                Ok(Answer {
                    text,
                    route: Route::Refine,
                    score: retrieval.score,
                    matched_index: Some(retrieval.best_index),
                    candidate: Some(candidate),
                })
            }
            Route::Generate => {
                let text = self.generator.generate(query).await?;

                Ok(Answer {
                    text,
                    route: Route::Generate,
                    score: retrieval.score,
                    matched_index: None,
                    candidate: None,
                })
            }
        }
    }
}
