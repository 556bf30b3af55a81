//! TF-IDF similarity index over stored questions.
//!
//! Each question becomes an L2-normalized sparse vector of
//! `term_count * idf(term)` over a vocabulary fixed at build time, with
//! smoothed IDF: `ln((1 + n) / (1 + df)) + 1`. Queries are projected into the
//! same space and compared by cosine similarity. Since every vector is unit
//! length, cosine similarity reduces to a dot product.

use crate::store::KnowledgeStore;
use std::collections::{BTreeMap, BTreeSet};

/// Sparse vector: `(term id, weight)` pairs sorted by term id.
type SparseVector = Vec<(usize, f64)>;

/// Fitted vector-space model plus one vector per stored question.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    /// Term -> column, in lexicographic term order
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseVector>,
}

impl SimilarityIndex {
    /// Fit the vocabulary and IDF weights on every question in `store`.
    pub fn build(store: &KnowledgeStore) -> Self {
        Self::from_documents(store.questions())
    }

    /// Fit on arbitrary documents, one row per document.
    pub fn from_documents<'a, I>(documents: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let tokenized: Vec<Vec<String>> = documents.into_iter().map(tokenize).collect();

        let terms: BTreeSet<&str> = tokenized
            .iter()
            .flat_map(|tokens| tokens.iter().map(String::as_str))
            .collect();
        let vocabulary: BTreeMap<String, usize> = terms
            .into_iter()
            .enumerate()
            .map(|(column, term)| (term.to_string(), column))
            .collect();

        // Document frequency per column
        let mut df = vec![0usize; vocabulary.len()];
        for tokens in &tokenized {
            let unique: BTreeSet<usize> = tokens
                .iter()
                .filter_map(|t| vocabulary.get(t).copied())
                .collect();
            for column in unique {
                df[column] += 1;
            }
        }

        let n_docs = tokenized.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&count| ((1.0 + n_docs) / (1.0 + count as f64)).ln() + 1.0)
            .collect();

        let mut index = Self {
            vocabulary,
            idf,
            rows: Vec::with_capacity(tokenized.len()),
        };
        index.rows = tokenized.iter().map(|tokens| index.vectorize(tokens)).collect();

        tracing::debug!(
            "Built similarity index: {} rows, {} terms",
            index.rows.len(),
            index.vocabulary.len()
        );

        index
    }

    /// Number of indexed rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of distinct terms fitted at build time.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Best-matching row and its score.
    ///
    /// Ties go to the lowest row. A query sharing no terms with the
    /// vocabulary scores 0 against every row and yields `(0, 0.0)`; the
    /// returned row is then meaningless until the caller checks the score.
    pub fn query(&self, text: &str) -> (usize, f64) {
        let mut best = (0usize, 0.0f64);

        for (row, score) in self.raw_scores(text).into_iter().enumerate() {
            if score > best.1 {
                best = (row, score);
            }
        }

        (best.0, clamp_score(best.1))
    }

    /// Similarity of `text` against every row, in row order.
    pub fn scores(&self, text: &str) -> Vec<f64> {
        self.raw_scores(text).into_iter().map(clamp_score).collect()
    }

    /// The `limit` best rows, highest score first, ties in row order.
    pub fn top_matches(&self, text: &str, limit: usize) -> Vec<(usize, f64)> {
        let mut ranked: Vec<(usize, f64)> = self.scores(text).into_iter().enumerate().collect();
        // Stable sort keeps row order among equal scores
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(limit);
        ranked
    }

    fn raw_scores(&self, text: &str) -> Vec<f64> {
        let query = self.vectorize(&tokenize(text));
        if query.is_empty() {
            return vec![0.0; self.rows.len()];
        }

        self.rows.iter().map(|row| dot(row, &query)).collect()
    }

    /// Project tokens into the fitted space. Unknown terms are dropped.
    fn vectorize(&self, tokens: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens {
            if let Some(&column) = self.vocabulary.get(token) {
                *counts.entry(column).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVector = counts
            .into_iter()
            .map(|(column, count)| (column, count * self.idf[column]))
            .collect();

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut vector {
                *w /= norm;
            }
        }

        vector
    }
}

/// Lowercase and split on anything that is not alphanumeric or `_`,
/// keeping tokens of at least two characters.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .map(str::to_string)
        .collect()
}

/// Dot product of two sparse vectors sorted by column.
fn dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;

    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }

    sum
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 1.0)
}
