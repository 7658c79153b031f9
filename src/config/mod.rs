#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

pub use crate::domain::ports::ConfigProvider;

use crate::utils::error::{EmailIntelError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_DELAY_MS: u64 = 1000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 60;
pub const DEFAULT_MAX_TOKENS: u32 = 200;
pub const DEFAULT_OUTPUT_FILE: &str = "email_analysis_results.csv";
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    #[serde(rename = "openai")]
    #[cfg_attr(feature = "cli", value(name = "openai"))]
    OpenAi,
    Gemini,
}

impl ProviderKind {
    /// Environment variable consulted when no key is configured explicitly.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Anthropic => "claude-3-5-haiku-20241022",
            Self::OpenAi => "gpt-4o-mini",
            Self::Gemini => "gemini-flash-latest",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Anthropic => "https://api.anthropic.com",
            Self::OpenAi => "https://api.openai.com",
            Self::Gemini => "https://generativelanguage.googleapis.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column set of the results table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputLayout {
    /// `email_from, subject, ai_analysis`
    #[default]
    Summary,
    /// `From, Category, Urgency, Intent, Suggested Action, Error`
    Expanded,
}

/// Everything a provider adapter needs, resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub max_tokens: u32,
}

impl ProviderSettings {
    pub fn new(kind: ProviderKind, api_key: impl Into<String>) -> Self {
        Self {
            kind,
            api_key: api_key.into(),
            model: kind.default_model().to_string(),
            base_url: kind.default_base_url().to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(base_url) = base_url {
            self.base_url = base_url;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

// Keeps the key out of `--verbose` config dumps.
impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("kind", &self.kind)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl Validate for ProviderSettings {
    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(EmailIntelError::MissingConfigError {
                field: "api_key".to_string(),
            });
        }
        validation::validate_non_empty_string("model", &self.model)?;
        validation::validate_url("base_url", &self.base_url)?;
        if self.timeout.is_zero() {
            return Err(EmailIntelError::InvalidConfigValueError {
                field: "timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }
        Ok(())
    }
}

/// Pacing and retry policy of the batch loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Pause between two consecutive records.
    pub delay: Duration,
    /// Extra attempts after a provider error; 0 means a failure is final.
    pub retry_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            retry_attempts: 0,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
        }
    }
}

impl BatchOptions {
    /// No pauses and no retries.
    pub fn immediate() -> Self {
        Self {
            delay: Duration::ZERO,
            retry_attempts: 0,
            retry_delay: Duration::ZERO,
        }
    }
}

impl Validate for BatchOptions {
    fn validate(&self) -> Result<()> {
        validation::validate_range("retry_attempts", self.retry_attempts, 0, MAX_RETRY_ATTEMPTS)
    }
}

/// Resolve the API key: explicit value first, then the provider's variable.
pub fn resolve_api_key(kind: ProviderKind, explicit: Option<&str>) -> Result<String> {
    let from_env = std::env::var(kind.api_key_env()).ok();
    let key = explicit
        .map(str::to_string)
        .or(from_env)
        .filter(|k| !k.trim().is_empty());
    validation::validate_required_field("api_key", &key).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_settings_defaults() {
        let settings = ProviderSettings::new(ProviderKind::Gemini, "key");
        assert_eq!(settings.model, "gemini-flash-latest");
        assert_eq!(settings.base_url, "https://generativelanguage.googleapis.com");
        assert_eq!(settings.max_tokens, DEFAULT_MAX_TOKENS);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_provider_settings_overrides() {
        let settings = ProviderSettings::new(ProviderKind::OpenAi, "key")
            .with_model(Some("gpt-4o".to_string()))
            .with_base_url(None);
        assert_eq!(settings.model, "gpt-4o");
        assert_eq!(settings.base_url, "https://api.openai.com");
    }

    #[test]
    fn test_blank_api_key_is_missing() {
        let settings = ProviderSettings::new(ProviderKind::Anthropic, "  ");
        assert!(matches!(
            settings.validate(),
            Err(EmailIntelError::MissingConfigError { field }) if field == "api_key"
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = ProviderSettings::new(ProviderKind::Anthropic, "sk-secret");
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_explicit_api_key_wins() {
        let key = resolve_api_key(ProviderKind::Anthropic, Some("explicit")).unwrap();
        assert_eq!(key, "explicit");
    }

    #[test]
    fn test_batch_options_retry_bound() {
        let options = BatchOptions {
            retry_attempts: MAX_RETRY_ATTEMPTS + 1,
            ..BatchOptions::default()
        };
        assert!(options.validate().is_err());
        assert!(BatchOptions::default().validate().is_ok());
    }
}
