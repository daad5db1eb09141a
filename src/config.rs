//! Provider selection from the process environment.
//!
//! `API_HOST` picks one of four hosted completion backends; each maps to
//! an (endpoint, credential, model) triple, fixed for the process lifetime.

use std::fmt;

use thiserror::Error;
use tracing::info;

// ============================================================================
// ApiHost
// ============================================================================

/// Which backend to send completions to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiHost {
    Azure,
    Ollama,
    Github,
    OpenAi,
}

impl ApiHost {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "azure" => Ok(Self::Azure),
            "ollama" => Ok(Self::Ollama),
            "github" => Ok(Self::Github),
            "openai" => Ok(Self::OpenAi),
            other => Err(ConfigError::UnknownHost(other.to_string())),
        }
    }
}

impl fmt::Display for ApiHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Azure => "azure",
            Self::Ollama => "ollama",
            Self::Github => "github",
            Self::OpenAi => "openai",
        };
        f.write_str(name)
    }
}

// ============================================================================
// ProviderConfig
// ============================================================================

const GITHUB_MODELS_URL: &str = "https://models.github.ai/inference";
const OPENAI_URL: &str = "https://api.openai.com/v1";
const DEFAULT_GITHUB_MODEL: &str = "openai/gpt-4o";

/// Resolved backend settings, immutable after startup.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub host: ApiHost,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl ProviderConfig {
    /// Resolve from the process environment. `API_HOST` defaults to `github`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::resolve(|name| std::env::var(name).ok())?;
        info!(host = %config.host, model = %config.model, "resolved provider");
        Ok(config)
    }

    /// Resolve against an arbitrary variable lookup.
    pub fn resolve<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = match lookup("API_HOST") {
            Some(value) => ApiHost::parse(&value)?,
            None => ApiHost::Github,
        };

        let require = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar(name));

        let config = match host {
            ApiHost::Azure => Self {
                host,
                base_url: require("AZURE_OPENAI_ENDPOINT")?,
                api_key: Some(require("AZURE_OPENAI_API_KEY")?),
                model: require("AZURE_OPENAI_CHAT_DEPLOYMENT")?,
            },
            ApiHost::Ollama => Self {
                host,
                base_url: require("OLLAMA_ENDPOINT")?,
                api_key: None,
                model: require("OLLAMA_MODEL")?,
            },
            ApiHost::Github => Self {
                host,
                base_url: GITHUB_MODELS_URL.to_string(),
                api_key: Some(require("GITHUB_TOKEN")?),
                model: lookup("GITHUB_MODEL").unwrap_or_else(|| DEFAULT_GITHUB_MODEL.to_string()),
            },
            ApiHost::OpenAi => Self {
                host,
                base_url: OPENAI_URL.to_string(),
                api_key: Some(require("OPENAI_KEY")?),
                model: require("OPENAI_MODEL")?,
            },
        };

        Ok(config)
    }
}

// ============================================================================
// ConfigError
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown API_HOST '{0}' (expected azure, ollama, github, or openai)")]
    UnknownHost(String),

    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

// ============================================================================
// Tests
// ============================================================================
