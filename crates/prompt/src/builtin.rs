//! Prompts shipped with the binary.

use crate::types::PromptDefinition;
use medqa_core::{AppError, AppResult};

/// Prompt used to rewrite a stored knowledge-base answer.
pub const REFINE_PROMPT_ID: &str = "medqa.refine";

/// Prompt used when no stored answer is close enough.
pub const GENERATE_PROMPT_ID: &str = "medqa.generate";

const BUILTIN_SOURCES: [(&str, &str); 2] = [
    (REFINE_PROMPT_ID, include_str!("../prompts/medqa.refine.yml")),
    (GENERATE_PROMPT_ID, include_str!("../prompts/medqa.generate.yml")),
];

/// Look up a built-in prompt by ID.
///
/// Returns `Ok(None)` when no built-in prompt carries that ID.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<Option<PromptDefinition>> {
    BUILTIN_SOURCES
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .map(|(id, source)| {
            serde_yaml::from_str(source).map_err(|e| {
                AppError::Prompt(format!("Built-in prompt '{}' is invalid: {}", id, e))
            })
        })
        .transpose()
}

/// IDs of all built-in prompts.
pub fn builtin_ids() -> Vec<&'static str> {
    BUILTIN_SOURCES.iter().map(|(id, _)| *id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_parses_with_matching_id() {
        for id in builtin_ids() {
            let def = builtin_prompt(id).unwrap().unwrap();
            assert_eq!(def.id, id);
            assert!(!def.template.is_empty());
        }
    }

    #[test]
    fn test_unknown_builtin_is_none() {
        assert!(builtin_prompt("medqa.summarize").unwrap().is_none());
    }
}
