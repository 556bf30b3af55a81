//! Knowledge store loading.
//!
//! The knowledge base is a CSV file with a header row containing
//! `short_question` and `short_answer`. Loading is all-or-nothing.

use crate::types::KnowledgeEntry;
use medqa_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Column holding the stored questions.
pub const QUESTION_COLUMN: &str = "short_question";

/// Column holding the stored answers.
pub const ANSWER_COLUMN: &str = "short_answer";

/// Ordered, non-empty set of normalized question/answer pairs.
///
/// Position `i` in the store is row `i` of the similarity index built from it.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    entries: Vec<KnowledgeEntry>,
    source: Option<PathBuf>,
}

impl KnowledgeStore {
    /// Load a store from a CSV file.
    ///
    /// # Errors
    /// - `AppError::NotFound` if `path` does not exist
    /// - `AppError::Empty` if the file has no data rows
    /// - `AppError::Format` if the CSV is malformed or lacks a required column
    pub fn load(path: &Path) -> AppResult<Self> {
        tracing::info!("Loading knowledge base from {:?}", path);

        if !path.exists() {
            return Err(AppError::NotFound(path.display().to_string()));
        }

        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

        let headers = reader.headers()?.clone();
        let records = reader.records().collect::<Result<Vec<_>, _>>()?;

        if records.is_empty() {
            return Err(AppError::Empty(path.display().to_string()));
        }

        let question_idx = column_index(&headers, QUESTION_COLUMN)?;
        let answer_idx = column_index(&headers, ANSWER_COLUMN)?;

        let entries: Vec<KnowledgeEntry> = records
            .iter()
            .map(|record| {
                KnowledgeEntry::new(
                    record.get(question_idx).unwrap_or(""),
                    record.get(answer_idx).unwrap_or(""),
                )
            })
            .collect();

        tracing::info!("Loaded {} knowledge entries", entries.len());

        Ok(Self {
            entries,
            source: Some(path.to_path_buf()),
        })
    }

    /// Build a store from in-memory pairs, applying the same normalization.
    ///
    /// Returns `AppError::Empty` when `pairs` is empty.
    pub fn from_pairs<I, Q, A>(pairs: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (Q, A)>,
        Q: AsRef<str>,
        A: AsRef<str>,
    {
        let entries: Vec<KnowledgeEntry> = pairs
            .into_iter()
            .map(|(q, a)| KnowledgeEntry::new(q.as_ref(), a.as_ref()))
            .collect();

        if entries.is_empty() {
            return Err(AppError::Empty("no entries supplied".to_string()));
        }

        Ok(Self {
            entries,
            source: None,
        })
    }

    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&KnowledgeEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a successfully constructed store.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File the store was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Iterator over the stored questions, in row order.
    pub fn questions(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.question.as_str())
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> AppResult<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .ok_or_else(|| {
            AppError::Format(format!(
                "missing required column '{}' (found: {})",
                name,
                headers.iter().collect::<Vec<_>>().join(", ")
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("kb.csv");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_normalizes_entries() {
        let temp = TempDir::new().unwrap();
        let path = write_csv(
            &temp,
            "short_question,short_answer,tags\n\
             What is a Headache?,Pain in the HEAD,neuro\n\
             \"Fever, what now?\",\"Rest, fluids\",general\n",
        );

        let store = KnowledgeStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(0).unwrap().question, "what is a headache?");
        assert_eq!(store.get(0).unwrap().answer, "pain in the head");
        assert_eq!(store.get(1).unwrap().question, "fever, what now?");
        assert_eq!(store.source(), Some(path.as_path()));
    }

    #[test]
    fn test_load_missing_cells_become_empty() {
        let temp = TempDir::new().unwrap();
        let path = write_csv(
            &temp,
            "short_answer,short_question\n\
             ,orphan question\n\
             lonely answer\n",
        );

        let store = KnowledgeStore::load(&path).unwrap();
        assert_eq!(store.get(0).unwrap().answer, "");
        assert_eq!(store.get(0).unwrap().question, "orphan question");
        assert_eq!(store.get(1).unwrap().answer, "lonely answer");
        assert_eq!(store.get(1).unwrap().question, "");
    }

    #[test]
    fn test_load_missing_file() {
        let temp = TempDir::new().unwrap();
        let result = KnowledgeStore::load(&temp.path().join("absent.csv"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_load_header_only_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = write_csv(&temp, "short_question,short_answer\n");
        assert!(matches!(KnowledgeStore::load(&path), Err(AppError::Empty(_))));
    }

    #[test]
    fn test_load_blank_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = write_csv(&temp, "");
        assert!(matches!(KnowledgeStore::load(&path), Err(AppError::Empty(_))));
    }

    #[test]
    fn test_load_missing_column_is_format_error() {
        let temp = TempDir::new().unwrap();
        let path = write_csv(&temp, "question,answer\nwhat is flu,a virus\n");

        match KnowledgeStore::load(&path) {
            Err(AppError::Format(msg)) => assert!(msg.contains("short_question")),
            other => panic!("Expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_pairs() {
        let store = KnowledgeStore::from_pairs([("What is a Headache", "Pain")]).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.source().is_none());
        assert_eq!(store.questions().collect::<Vec<_>>(), vec!["what is a headache"]);
    }

    #[test]
    fn test_from_pairs_empty() {
        let pairs: Vec<(&str, &str)> = Vec::new();
        assert!(matches!(
            KnowledgeStore::from_pairs(pairs),
            Err(AppError::Empty(_))
        ));
    }
}
