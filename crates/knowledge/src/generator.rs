//! Answer composition through an external text-generation service.

use medqa_core::AppResult;
use medqa_llm::{LlmClient, LlmRequest};
use medqa_prompt::{
    build_prompt, builtin_prompt, load_prompt, PromptDefinition, GENERATE_PROMPT_ID,
    REFINE_PROMPT_ID,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// The two ways the engine asks for text.
#[async_trait::async_trait]
pub trait FallbackGenerator: Send + Sync {
    /// Rewrite a stored answer for the user's query.
    async fn refine(&self, query: &str, candidate: &str) -> AppResult<String>;

    /// Answer the query with no stored seed.
    async fn generate(&self, query: &str) -> AppResult<String>;
}

/// [`FallbackGenerator`] backed by an [`LlmClient`].
///
/// Both prompts are resolved once at construction; each call renders one of
/// them and sends a single completion request.
pub struct LlmFallbackGenerator {
    client: Arc<dyn LlmClient>,
    model: String,
    refine_prompt: PromptDefinition,
    generate_prompt: PromptDefinition,
}

impl LlmFallbackGenerator {
    /// Use the built-in refine and generate prompts.
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            client,
            model: model.into(),
            refine_prompt: required_builtin(REFINE_PROMPT_ID)?,
            generate_prompt: required_builtin(GENERATE_PROMPT_ID)?,
        })
    }

    /// Use prompts from the workspace, falling back to the built-ins.
    pub fn from_workspace(
        client: Arc<dyn LlmClient>,
        model: impl Into<String>,
        workspace: &Path,
    ) -> AppResult<Self> {
        Ok(Self {
            client,
            model: model.into(),
            refine_prompt: load_prompt(workspace, REFINE_PROMPT_ID)?,
            generate_prompt: load_prompt(workspace, GENERATE_PROMPT_ID)?,
        })
    }

    pub fn provider_name(&self) -> &str {
        self.client.provider_name()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(
        &self,
        prompt: &PromptDefinition,
        variables: HashMap<String, String>,
    ) -> AppResult<String> {
        let built = build_prompt(prompt, variables)?;

        tracing::debug!(
            "Sending {} request to {} (model: {}, variables: {})",
            built.metadata.source_prompt_id,
            self.client.provider_name(),
            self.model,
            built.metadata.resolved_variables.len()
        );

        let mut request = LlmRequest::new(built.user, &self.model);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }

        let response = self.client.complete(&request).await?;
        Ok(response.content)
    }
}

#[async_trait::async_trait]
impl FallbackGenerator for LlmFallbackGenerator {
    async fn refine(&self, query: &str, candidate: &str) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.to_string());
        variables.insert("answer".to_string(), candidate.to_string());

        self.complete(&self.refine_prompt, variables).await
    }

    async fn generate(&self, query: &str) -> AppResult<String> {
        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.to_string());

        self.complete(&self.generate_prompt, variables).await
    }
}

fn required_builtin(id: &str) -> AppResult<PromptDefinition> {
    builtin_prompt(id)?.ok_or_else(|| {
        medqa_core::AppError::Prompt(format!("Built-in prompt '{}' is missing", id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use medqa_core::AppError;
    use medqa_llm::{LlmResponse, LlmUsage};
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Records every request and answers with a fixed reply or error.
    struct RecordingClient {
        reply: Result<String, String>,
        requests: Mutex<Vec<LlmRequest>>,
    }

    impl RecordingClient {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(text.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(message.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn last_prompt(&self) -> String {
            self.requests.lock().unwrap().last().unwrap().prompt.clone()
        }
    }

    #[async_trait::async_trait]
    impl LlmClient for RecordingClient {
        fn provider_name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            self.requests.lock().unwrap().push(request.clone());
            match &self.reply {
                Ok(text) => Ok(LlmResponse {
                    content: text.clone(),
                    model: request.model.clone(),
                    usage: LlmUsage::default(),
                }),
                Err(message) => Err(AppError::Generation(message.clone())),
            }
        }
    }

    #[tokio::test]
    async fn test_refine_sends_candidate_and_query() {
        let client = RecordingClient::replying("- refined");
        let generator = LlmFallbackGenerator::new(client.clone(), "gemini-1.5-flash").unwrap();

        let text = generator
            .refine("what is a headache", "pain in the head")
            .await
            .unwrap();
        assert_eq!(text, "- refined");

        let prompt = client.last_prompt();
        assert!(prompt.starts_with("You are a medical chatbot. Refine the following answer"));
        assert!(prompt.contains("User Query: what is a headache\n"));
        assert!(prompt.contains("Closest Answer: pain in the head\n"));
        assert!(prompt.ends_with("Refined Answer:"));

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests[0].model, "gemini-1.5-flash");
        assert!(requests[0].system.is_none());
    }

    #[tokio::test]
    async fn test_generate_sends_query_only() {
        let client = RecordingClient::replying("see a doctor");
        let generator = LlmFallbackGenerator::new(client.clone(), "llama3.2").unwrap();

        let text = generator.generate("my knee hurts & swells").await.unwrap();
        assert_eq!(text, "see a doctor");

        let prompt = client.last_prompt();
        assert!(prompt.starts_with("You are a medical chatbot. Provide accurate"));
        assert!(prompt.contains("User: my knee hurts & swells\n"));
        assert!(prompt.ends_with("Bot:"));
    }

    #[tokio::test]
    async fn test_client_errors_propagate() {
        let client = RecordingClient::failing("connection refused");
        let generator = LlmFallbackGenerator::new(client, "gemini-1.5-flash").unwrap();

        match generator.generate("anything").await {
            Err(AppError::Generation(msg)) => assert_eq!(msg, "connection refused"),
            other => panic!("Expected generation error, got {:?}", other),
        }
        assert!(generator.refine("anything", "stored").await.is_err());
    }

    #[tokio::test]
    async fn test_workspace_prompt_override() {
        let temp = TempDir::new().unwrap();
        let dir = medqa_prompt::prompts_dir(temp.path());
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("{}.yml", GENERATE_PROMPT_ID)),
            r#"
id: medqa.generate
title: Terse
apiVersion: "1.0"
behavior:
  tone: plain
  style: short
input:
  variables: [query]
system: "Answer in one line."
template: "Q: {{query}}"
output:
  format: text
"#,
        )
        .unwrap();

        let client = RecordingClient::replying("ok");
        let generator =
            LlmFallbackGenerator::from_workspace(client.clone(), "gemini-1.5-flash", temp.path())
                .unwrap();
        generator.generate("flu?").await.unwrap();

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests[0].prompt, "Q: flu?");
        assert_eq!(requests[0].system.as_deref(), Some("Answer in one line."));

        drop(requests);
        generator.refine("flu?", "rest").await.unwrap();
        assert!(client.last_prompt().contains("Closest Answer: rest"));
    }

    #[test]
    fn test_reports_provider_and_model() {
        let generator =
            LlmFallbackGenerator::new(RecordingClient::replying(""), "gemini-1.5-flash").unwrap();
        assert_eq!(generator.provider_name(), "recording");
        assert_eq!(generator.model(), "gemini-1.5-flash");
    }
}
