//! Prompt system for MedQA.
//!
//! This crate provides structured prompt management with:
//! - Built-in refine/generate prompts
//! - YAML overrides from the workspace
//! - Handlebars template rendering

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use builtin::{builtin_ids, builtin_prompt, GENERATE_PROMPT_ID, REFINE_PROMPT_ID};
pub use loader::{list_prompts, load_prompt, prompts_dir};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptBehavior, PromptDefinition, PromptInputSpec,
    PromptOutputSpec,
};
