//! Configuration management
//!
//! Loaded from `config/default.toml`, an optional `config/{ENV}.toml`, an
//! optional `config/local.toml`, then environment variables with the
//! `CODEAUDIT` prefix and `__` separator, e.g.:
//!
//! ```bash
//! CODEAUDIT__SERVER__PORT=3000
//! CODEAUDIT__LLM__API_KEY=sk-...
//! ```

use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub llm: LlmConfig,
    pub github: GitHubConfig,
    pub analysis: AnalysisConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// CORS origins; a single "*" entry allows any origin
    pub allowed_origins: Vec<String>,
    /// Whole-request deadline, generous enough for multi-file model batches
    pub request_timeout_seconds: u64,
    /// Expose the OpenAPI document at /api-docs/openapi.json
    pub enable_docs: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            allowed_origins: vec!["*".to_string()],
            request_timeout_seconds: 300,
            enable_docs: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when RUST_LOG is unset
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Policy for model findings missing required fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncompleteFindingPolicy {
    /// Discard findings without title, severity, and a positive line
    #[default]
    Drop,
    /// Keep them, defaulting severity to Medium and line to 1
    Fill,
}

/// Model completion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API key; OPENAI_API_KEY is used when unset. Absence degrades analysis
    /// to a synthetic explanatory finding rather than failing startup.
    pub api_key: Option<String>,
    /// OpenAI-compatible API base URL
    pub base_url: String,
    /// First model tried for every file
    pub primary_model: String,
    /// Model retried with the identical prompt when the primary fails
    pub fallback_model: String,
    /// Near-zero keeps repeated calls on identical input reproducible
    pub temperature: f64,
    pub max_tokens: u32,
    /// Per-call deadline
    pub timeout_seconds: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            primary_model: "gpt-5".to_string(),
            fallback_model: "gpt-4o".to_string(),
            temperature: 0.0,
            max_tokens: 2048,
            timeout_seconds: 60,
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from config or the conventional env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

/// GitHub content API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub base_url: String,
    /// Token for private repositories and higher rate limits; GITHUB_TOKEN
    /// is used when unset
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            token: None,
            timeout_seconds: 30,
        }
    }
}

impl GitHubConfig {
    pub fn resolve_token(&self) -> Option<String> {
        self.token
            .clone()
            .or_else(|| std::env::var("GITHUB_TOKEN").ok())
            .filter(|token| !token.trim().is_empty())
    }
}

/// Analysis pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Repository file cap for quick scans
    pub quick_scan_files: usize,
    /// Repository file cap for deep scans
    pub deep_scan_files: usize,
    /// Repository files larger than this many characters are skipped
    pub max_file_chars: usize,
    pub incomplete_findings: IncompleteFindingPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            quick_scan_files: 5,
            deep_scan_files: 20,
            max_file_chars: 50_000,
            incomplete_findings: IncompleteFindingPolicy::Drop,
        }
    }
}

/// Error raised by post-load validation
#[derive(Debug, thiserror::Error)]
#[error("Invalid configuration: {0}")]
pub struct ValidationError(String);

impl Config {
    /// Load configuration from files and environment variables.
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false));

        if let Ok(env) = std::env::var("ENV") {
            builder = builder
                .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
        }

        builder = builder
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("CODEAUDIT").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.server.port == 0 {
            return Err(ValidationError("server.port must be non-zero".to_string()));
        }
        if self.server.allowed_origins.is_empty() {
            return Err(ValidationError(
                "server.allowed_origins must not be empty".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ValidationError(
                "llm.temperature must be in [0.0, 2.0]".to_string(),
            ));
        }
        if self.llm.primary_model.is_empty() || self.llm.fallback_model.is_empty() {
            return Err(ValidationError(
                "llm model identifiers must not be empty".to_string(),
            ));
        }
        if self.analysis.quick_scan_files == 0 || self.analysis.deep_scan_files == 0 {
            return Err(ValidationError(
                "analysis scan file caps must be > 0".to_string(),
            ));
        }
        if self.analysis.max_file_chars == 0 {
            return Err(ValidationError(
                "analysis.max_file_chars must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigLoadError {
    #[error("Configuration file error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.primary_model, "gpt-5");
        assert_eq!(config.llm.fallback_model, "gpt-4o");
        assert_eq!(config.llm.temperature, 0.0);
        assert_eq!(config.analysis.quick_scan_files, 5);
        assert_eq!(config.analysis.deep_scan_files, 20);
        assert_eq!(config.analysis.max_file_chars, 50_000);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = Config::default();
        config.llm.temperature = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.analysis.deep_scan_files = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_incomplete_finding_policy_deserializes_snake_case() {
        assert_eq!(
            serde_json::from_str::<IncompleteFindingPolicy>("\"drop\"").unwrap(),
            IncompleteFindingPolicy::Drop
        );
        assert_eq!(
            serde_json::from_str::<IncompleteFindingPolicy>("\"fill\"").unwrap(),
            IncompleteFindingPolicy::Fill
        );
    }
}
