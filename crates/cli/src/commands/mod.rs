//! Command handlers for the MedQA CLI.

pub mod ask;
pub mod chat;
pub mod knowledge;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use chat::ChatCommand;
pub use knowledge::KnowledgeCommand;
