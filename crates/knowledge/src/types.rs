//! Core types for the knowledge base and retrieval decisions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A stored question/answer pair.
///
/// Both fields are lowercase and never absent: missing cells become `""`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub question: String,
    pub answer: String,
}

impl KnowledgeEntry {
    /// Create a normalized entry.
    pub fn new(question: &str, answer: &str) -> Self {
        Self {
            question: question.to_lowercase(),
            answer: answer.to_lowercase(),
        }
    }
}

/// Which answer-composition path a query takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    /// Rewrite the stored answer of the best match
    Refine,
    /// Generate an answer with no stored seed
    Generate,
}

impl Route {
    /// Decide the route for a similarity score.
    ///
    /// Only scores strictly above `threshold` trust the stored answer.
    pub fn for_score(score: f64, threshold: f64) -> Self {
        if score > threshold {
            Self::Refine
        } else {
            Self::Generate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Refine => "refine",
            Self::Generate => "generate",
        }
    }
}

/// Outcome of the similarity lookup and threshold gate, before any
/// generation call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Retrieval {
    /// Row of the best-scoring question (0 when nothing matched)
    pub best_index: usize,

    /// Cosine similarity of the best match, in [0, 1]
    pub score: f64,

    /// Route chosen by the threshold gate
    pub route: Route,
}

/// Final answer returned by the retrieval engine.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// Text to show the user
    pub text: String,

    /// Path that produced the text
    pub route: Route,

    /// Similarity of the best match
    pub score: f64,

    /// Matched row, set on the refine path only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_index: Option<usize>,

    /// Stored answer before refinement, set on the refine path only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidate: Option<String>,
}

/// Knowledge base statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub source: Option<PathBuf>,
    pub entries: usize,
    pub vocabulary_size: usize,
    pub empty_questions: usize,
    pub empty_answers: usize,
    /// Prompt IDs overridden in the workspace
    #[serde(default)]
    pub prompt_overrides: Vec<String>,
}
