//! Configuration management for MedQA.
//!
//! Configuration is merged from several sources, later ones winning:
//! - Built-in defaults
//! - Config file (`.medqa/config.yaml` in the workspace, or `MEDQA_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Credentials are never stored in the config file itself. The file names
//! the environment variable that holds the key (`apiKeyEnv`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Providers the generation layer knows how to talk to.
pub const KNOWN_PROVIDERS: [&str; 2] = ["gemini", "ollama"];

/// Default similarity threshold for trusting a stored answer.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Environment variable read for the Gemini key when no provider table names one.
pub const DEFAULT_GEMINI_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .medqa/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation provider ("gemini" or "ollama")
    pub provider: String,

    /// Model identifier passed to the provider
    pub model: String,

    /// Explicit API key (from `MEDQA_API_KEY`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Knowledge base CSV, relative to the workspace unless absolute
    pub knowledge_base: PathBuf,

    /// Minimum similarity (exclusive) for answering from the knowledge base
    pub threshold: f64,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Provider table from config.yaml
    pub llm: Option<LlmConfig>,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    /// Provider tables, keyed by provider name
    #[serde(default, deserialize_with = "deserialize_providers")]
    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
///
/// The variant is chosen by the table's key under `providers`, never by
/// which fields happen to be present.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    Gemini(GeminiProviderConfig),
    Ollama(OllamaProviderConfig),
}

/// `providers.gemini` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiProviderConfig {
    /// Environment variable holding the API key
    #[serde(rename = "apiKeyEnv", default = "default_gemini_key_env")]
    pub api_key_env: String,

    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub endpoint: Option<String>,
}

/// `providers.ollama` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaProviderConfig {
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub model: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
}

fn default_gemini_key_env() -> String {
    DEFAULT_GEMINI_KEY_ENV.to_string()
}

fn deserialize_providers<'de, D>(
    deserializer: D,
) -> Result<HashMap<String, ProviderConfig>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let raw = HashMap::<String, serde_yaml::Value>::deserialize(deserializer)?;

    raw.into_iter()
        .map(|(name, table)| {
            let config = match name.as_str() {
                "gemini" => serde_yaml::from_value(table).map(ProviderConfig::Gemini),
                "ollama" => serde_yaml::from_value(table).map(ProviderConfig::Ollama),
                other => {
                    return Err(D::Error::custom(format!(
                        "unknown provider table '{}' (supported: {})",
                        other,
                        KNOWN_PROVIDERS.join(", ")
                    )))
                }
            }
            .map_err(|e| D::Error::custom(format!("providers.{}: {}", name, e)))?;

            Ok((name, config))
        })
        .collect()
}

impl ProviderConfig {
    /// Model configured for this provider, if any.
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Gemini(gemini) => gemini.model.as_deref(),
            Self::Ollama(ollama) => ollama.model.as_deref(),
        }
    }

    /// Custom endpoint, if one is configured.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Gemini(gemini) => gemini.endpoint.as_deref(),
            Self::Ollama(ollama) => ollama.endpoint.as_deref(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    knowledge: Option<KnowledgeSection>,
    workspace: Option<WorkspaceSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KnowledgeSection {
    path: Option<String>,
    threshold: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceSection {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "gemini".to_string(),
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            knowledge_base: PathBuf::from("med_bot_data.csv"),
            threshold: DEFAULT_THRESHOLD,
            log_level: None,
            verbose: false,
            no_color: false,
            llm: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables, the config file and defaults.
    ///
    /// Environment variables:
    /// - `MEDQA_WORKSPACE`: Override workspace path
    /// - `MEDQA_CONFIG`: Path to config file
    /// - `MEDQA_PROVIDER`: Generation provider
    /// - `MEDQA_MODEL`: Model identifier
    /// - `MEDQA_API_KEY`: API key
    /// - `MEDQA_KNOWLEDGE_BASE`: Knowledge base CSV path
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use medqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Knowledge base: {:?}", config.knowledge_path());
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_with(None, None)
    }

    /// Load configuration with the workspace and config file given on the
    /// command line.
    ///
    /// Both are resolved before the config file is read, so they take
    /// precedence over `MEDQA_WORKSPACE` and `MEDQA_CONFIG`.
    pub fn load_with(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_from_env(workspace, config_file, |name| std::env::var(name).ok())
    }

    /// Load configuration using `env` as the variable lookup.
    pub fn load_from_env<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        env: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env("MEDQA_WORKSPACE").map(PathBuf::from)) {
            config.workspace = workspace;
        }

        config.config_file = config_file.or_else(|| env("MEDQA_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        match config.config_file.clone() {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                config = config.merge_yaml(&path)?;
            }
            None => {
                let default_path = config.medqa_dir().join("config.yaml");
                if default_path.exists() {
                    config = config.merge_yaml(&default_path)?;
                }
            }
        }

        // Environment variables override YAML config
        if let Some(provider) = env("MEDQA_PROVIDER") {
            config.provider = provider;
        }

        if let Some(model) = env("MEDQA_MODEL") {
            config.model = model;
        }

        if let Some(kb) = env("MEDQA_KNOWLEDGE_BASE") {
            config.knowledge_base = PathBuf::from(kb);
        }

        config.api_key = env("MEDQA_API_KEY");

        if let Some(level) = env("RUST_LOG") {
            config.log_level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        self.merge_yaml_str(&contents)
            .map_err(|e| AppError::Config(format!("Failed to parse config file {:?}: {}", path, e)))
    }

    fn merge_yaml_str(&self, contents: &str) -> Result<Self, serde_yaml::Error> {
        let config_file: ConfigFile = serde_yaml::from_str(contents)?;
        let mut result = self.clone();

        if let Some(path) = config_file.workspace.and_then(|ws| ws.path) {
            result.workspace = PathBuf::from(path);
        }

        if let Some(knowledge) = config_file.knowledge {
            if let Some(path) = knowledge.path {
                result.knowledge_base = PathBuf::from(path);
            }
            if let Some(threshold) = knowledge.threshold {
                result.threshold = threshold;
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(model) = llm
                .providers
                .get(&llm.active_provider)
                .and_then(ProviderConfig::model)
            {
                result.model = model.to_string();
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the file.
    /// The workspace and config file flags are applied earlier, by
    /// [`AppConfig::load_with`].
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        knowledge_base: Option<PathBuf>,
        threshold: Option<f64>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(knowledge_base) = knowledge_base {
            self.knowledge_base = knowledge_base;
        }

        if let Some(threshold) = threshold {
            self.threshold = threshold;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .medqa directory.
    pub fn medqa_dir(&self) -> PathBuf {
        self.workspace.join(".medqa")
    }

    /// Knowledge base path resolved against the workspace.
    pub fn knowledge_path(&self) -> PathBuf {
        self.workspace.join(&self.knowledge_base)
    }

    /// Get the configuration for a provider, if the config file defines one.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm.as_ref().and_then(|llm| llm.providers.get(provider))
    }

    /// Endpoint configured for the active provider.
    pub fn endpoint(&self) -> Option<&str> {
        self.get_provider_config(&self.provider)
            .and_then(ProviderConfig::endpoint)
    }

    /// Request timeout configured for the active provider, in seconds.
    pub fn timeout_secs(&self) -> Option<u64> {
        match self.get_provider_config(&self.provider) {
            Some(ProviderConfig::Ollama(ollama)) => ollama.timeout,
            _ => None,
        }
    }

    /// Resolve the API key for the active provider from the process environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the API key using `env` as the variable lookup.
    ///
    /// Order: explicit `MEDQA_API_KEY`, then the provider's `apiKeyEnv`,
    /// then `GOOGLE_API_KEY` for Gemini. Blank values count as missing.
    pub fn resolve_api_key_with<F>(&self, env: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(ref key) = self.api_key {
            if !key.trim().is_empty() {
                return Some(key.clone());
            }
        }

        let env_var = match self.get_provider_config(&self.provider) {
            Some(ProviderConfig::Gemini(gemini)) => Some(gemini.api_key_env.as_str()),
            Some(ProviderConfig::Ollama(_)) => None,
            None if self.provider == "gemini" => Some(DEFAULT_GEMINI_KEY_ENV),
            None => None,
        };

        env_var
            .and_then(env)
            .filter(|key| !key.trim().is_empty())
    }

    /// Whether the active provider needs a credential.
    pub fn requires_api_key(&self) -> bool {
        self.provider == "gemini"
    }

    /// Validate configuration for the active provider.
    pub fn validate(&self) -> AppResult<()> {
        self.validate_with(|name| std::env::var(name).ok())
    }

    /// Validate configuration using `env` as the variable lookup.
    pub fn validate_with<F>(&self, env: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !KNOWN_PROVIDERS.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if self.model.trim().is_empty() {
            return Err(AppError::Config("Model identifier is empty".to_string()));
        }

        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(AppError::Config(format!(
                "Similarity threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }

        if self.requires_api_key() && self.resolve_api_key_with(env).is_none() {
            let env_name = match self.get_provider_config(&self.provider) {
                Some(ProviderConfig::Gemini(gemini)) => gemini.api_key_env.clone(),
                _ => DEFAULT_GEMINI_KEY_ENV.to_string(),
            };
            return Err(AppError::Config(format!(
                "API key not found. Set MEDQA_API_KEY or {}",
                env_name
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "gemini");
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.threshold, 0.3);
        assert_eq!(config.knowledge_base, PathBuf::from("med_bot_data.csv"));
        assert!(!config.verbose);
    }

    #[test]
    fn test_medqa_dir() {
        let config = AppConfig::default();
        assert!(config.medqa_dir().ends_with(".medqa"));
    }

    #[test]
    fn test_knowledge_path_relative_and_absolute() {
        let mut config = AppConfig::default();
        config.workspace = PathBuf::from("/srv/medqa");
        assert_eq!(
            config.knowledge_path(),
            PathBuf::from("/srv/medqa/med_bot_data.csv")
        );

        config.knowledge_base = PathBuf::from("/data/kb.csv");
        assert_eq!(config.knowledge_path(), PathBuf::from("/data/kb.csv"));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default();
        let overridden = config.with_overrides(
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            Some(PathBuf::from("faq.csv")),
            Some(0.5),
            None,
            true,
            false,
        );

        assert_eq!(overridden.provider, "ollama");
        assert_eq!(overridden.model, "llama3.2");
        assert_eq!(overridden.knowledge_base, PathBuf::from("faq.csv"));
        assert_eq!(overridden.threshold, 0.5);
        assert!(overridden.verbose);
        assert_eq!(overridden.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_merge_yaml_selects_active_provider() {
        let yaml = r#"
llm:
  activeProvider: ollama
  providers:
    gemini:
      apiKeyEnv: MY_GEMINI_KEY
      model: gemini-1.5-pro
    ollama:
      endpoint: http://localhost:11434
      model: llama3.2
      timeout: 45
knowledge:
  path: data/faq.csv
  threshold: 0.4
logging:
  level: warn
  color: false
"#;
        let config = AppConfig::default().merge_yaml_str(yaml).unwrap();

        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "llama3.2");
        assert_eq!(config.endpoint(), Some("http://localhost:11434"));
        assert_eq!(config.timeout_secs(), Some(45));
        assert_eq!(config.knowledge_base, PathBuf::from("data/faq.csv"));
        assert_eq!(config.threshold, 0.4);
        assert_eq!(config.log_level, Some("warn".to_string()));
        assert!(config.no_color);
        assert!(matches!(
            config.get_provider_config("gemini"),
            Some(ProviderConfig::Gemini(_))
        ));
    }

    #[test]
    fn test_load_reads_workspace_config_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let medqa_dir = temp.path().join(".medqa");
        std::fs::create_dir_all(&medqa_dir).unwrap();
        let path = medqa_dir.join("config.yaml");
        std::fs::write(&path, "knowledge:\n  threshold: 0.25\n").unwrap();

        let config = AppConfig::default().merge_yaml(&path).unwrap();
        assert_eq!(config.threshold, 0.25);
    }

    #[test]
    fn test_merge_yaml_invalid_file_is_config_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        std::fs::write(&path, "llm: [not, a, map").unwrap();

        let result = AppConfig::default().merge_yaml(&path);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    fn write_file(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_load_with_config_flag_reads_named_file() {
        let workspace = tempfile::TempDir::new().unwrap();
        let custom = workspace.path().join("custom.yaml");
        write_file(&custom, "knowledge:\n  threshold: 0.9\n");

        let config = AppConfig::load_from_env(
            Some(workspace.path().to_path_buf()),
            Some(custom.clone()),
            no_env,
        )
        .unwrap();

        assert_eq!(config.threshold, 0.9);
        assert_eq!(config.config_file, Some(custom));
    }

    #[test]
    fn test_load_with_config_flag_beats_env_config() {
        let workspace = tempfile::TempDir::new().unwrap();
        let from_flag = workspace.path().join("flag.yaml");
        let from_env = workspace.path().join("env.yaml");
        write_file(&from_flag, "knowledge:\n  threshold: 0.7\n");
        write_file(&from_env, "knowledge:\n  threshold: 0.2\n");

        let env_path = from_env.display().to_string();
        let config = AppConfig::load_from_env(
            Some(workspace.path().to_path_buf()),
            Some(from_flag),
            |name| (name == "MEDQA_CONFIG").then(|| env_path.clone()),
        )
        .unwrap();

        assert_eq!(config.threshold, 0.7);
    }

    #[test]
    fn test_load_with_workspace_flag_reads_its_config() {
        let workspace = tempfile::TempDir::new().unwrap();
        write_file(
            &workspace.path().join(".medqa").join("config.yaml"),
            "knowledge:\n  threshold: 0.8\n",
        );

        let config =
            AppConfig::load_from_env(Some(workspace.path().to_path_buf()), None, no_env).unwrap();

        assert_eq!(config.workspace, workspace.path());
        assert_eq!(config.threshold, 0.8);
    }

    #[test]
    fn test_load_with_missing_config_flag_is_error() {
        let workspace = tempfile::TempDir::new().unwrap();
        let result = AppConfig::load_from_env(
            Some(workspace.path().to_path_buf()),
            Some(workspace.path().join("absent.yaml")),
            no_env,
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_load_env_overrides_file() {
        let workspace = tempfile::TempDir::new().unwrap();
        write_file(
            &workspace.path().join(".medqa").join("config.yaml"),
            "llm:\n  activeProvider: ollama\n  providers:\n    ollama:\n      model: llama3.2\n",
        );

        let config = AppConfig::load_from_env(Some(workspace.path().to_path_buf()), None, |name| {
            match name {
                "MEDQA_MODEL" => Some("mistral".to_string()),
                "NO_COLOR" => Some("1".to_string()),
                _ => None,
            }
        })
        .unwrap();

        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "mistral");
        assert!(config.no_color);
    }

    #[test]
    fn test_gemini_table_without_key_env_stays_gemini() {
        let yaml = r#"
llm:
  activeProvider: gemini
  providers:
    gemini:
      model: gemini-1.5-pro
      endpoint: http://proxy.local
"#;
        let config = AppConfig::default().merge_yaml_str(yaml).unwrap();

        match config.get_provider_config("gemini") {
            Some(ProviderConfig::Gemini(gemini)) => {
                assert_eq!(gemini.api_key_env, DEFAULT_GEMINI_KEY_ENV);
                assert_eq!(gemini.endpoint.as_deref(), Some("http://proxy.local"));
            }
            other => panic!("Expected gemini table, got {:?}", other),
        }
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.endpoint(), Some("http://proxy.local"));

        let env = |name: &str| (name == "GOOGLE_API_KEY").then(|| "k".to_string());
        assert_eq!(config.resolve_api_key_with(env), Some("k".to_string()));
        assert!(config.validate_with(env).is_ok());
    }

    #[test]
    fn test_ollama_table_without_endpoint() {
        let yaml = "llm:\n  activeProvider: ollama\n  providers:\n    ollama:\n      timeout: 10\n";
        let config = AppConfig::default().merge_yaml_str(yaml).unwrap();

        assert!(matches!(
            config.get_provider_config("ollama"),
            Some(ProviderConfig::Ollama(_))
        ));
        assert_eq!(config.endpoint(), None);
        assert_eq!(config.timeout_secs(), Some(10));
        // No model in the table keeps the default
        assert_eq!(config.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_unknown_provider_table_is_rejected() {
        let yaml = "llm:\n  activeProvider: gemini\n  providers:\n    openai:\n      model: gpt\n";
        assert!(AppConfig::default().merge_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_resolve_api_key_prefers_explicit_key() {
        let mut config = AppConfig::default();
        config.api_key = Some("explicit".to_string());
        let key = config.resolve_api_key_with(|_| Some("from-env".to_string()));
        assert_eq!(key, Some("explicit".to_string()));
    }

    #[test]
    fn test_resolve_api_key_falls_back_to_google_env() {
        let config = AppConfig::default();
        let key = config.resolve_api_key_with(|name| {
            (name == DEFAULT_GEMINI_KEY_ENV).then(|| "google-key".to_string())
        });
        assert_eq!(key, Some("google-key".to_string()));
    }

    #[test]
    fn test_resolve_api_key_ignores_blank_values() {
        let config = AppConfig::default();
        let key = config.resolve_api_key_with(|_| Some("   ".to_string()));
        assert_eq!(key, None);
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = AppConfig::default();
        config.provider = "unknown".to_string();
        assert!(matches!(config.validate_with(no_env), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_missing_gemini_key() {
        let config = AppConfig::default();
        match config.validate_with(no_env) {
            Err(AppError::Config(msg)) => assert!(msg.contains("GOOGLE_API_KEY")),
            other => panic!("Expected config error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_gemini_with_key() {
        let config = AppConfig::default();
        assert!(config
            .validate_with(|_| Some("secret".to_string()))
            .is_ok());
    }

    #[test]
    fn test_validate_ollama_needs_no_key() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        config.model = "llama3.2".to_string();
        assert!(config.validate_with(no_env).is_ok());
    }

    #[test]
    fn test_validate_threshold_range() {
        let mut config = AppConfig::default();
        config.provider = "ollama".to_string();
        config.threshold = 1.5;
        assert!(matches!(config.validate_with(no_env), Err(AppError::Config(_))));
    }
}
