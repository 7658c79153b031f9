use crate::config::{
    resolve_api_key, BatchOptions, ConfigProvider, OutputLayout, ProviderKind, ProviderSettings,
    DEFAULT_DELAY_MS, DEFAULT_MAX_TOKENS, DEFAULT_OUTPUT_FILE, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::utils::error::{EmailIntelError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub provider: ProviderConfig,
    pub batch: Option<BatchConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub file: Option<String>,
    pub layout: Option<OutputLayout>,
    pub preview: Option<usize>,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub max_tokens: Option<u32>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    pub delay_ms: Option<u64>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub json: Option<bool>,
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var pattern"))
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replace `${VAR}` with the variable's value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> String {
        env_var_pattern()
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Explicit key from the file, unless it is an unresolved `${VAR}`.
    fn configured_api_key(&self) -> Option<&str> {
        self.provider
            .api_key
            .as_deref()
            .filter(|key| !env_var_pattern().is_match(key))
    }

    pub fn provider_settings(&self) -> Result<ProviderSettings> {
        let api_key = resolve_api_key(self.provider.kind, self.configured_api_key())?;
        let settings = ProviderSettings::new(self.provider.kind, api_key)
            .with_model(self.provider.model.clone())
            .with_base_url(self.provider.base_url.clone())
            .with_timeout(Duration::from_secs(
                self.provider.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            ))
            .with_max_tokens(self.provider.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS));
        settings.validate()?;
        Ok(settings)
    }

    pub fn preview(&self) -> usize {
        self.output.preview.unwrap_or(3)
    }

    pub fn verbose(&self) -> bool {
        self.logging
            .as_ref()
            .and_then(|l| l.verbose)
            .unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for TomlConfig {
    fn input_file(&self) -> &str {
        &self.input.path
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_file(&self) -> &str {
        self.output.file.as_deref().unwrap_or(DEFAULT_OUTPUT_FILE)
    }

    fn layout(&self) -> OutputLayout {
        self.output.layout.unwrap_or_default()
    }

    fn batch_options(&self) -> BatchOptions {
        let batch = self.batch.as_ref();
        BatchOptions {
            delay: Duration::from_millis(
                batch.and_then(|b| b.delay_ms).unwrap_or(DEFAULT_DELAY_MS),
            ),
            retry_attempts: batch.and_then(|b| b.retry_attempts).unwrap_or(0),
            retry_delay: Duration::from_millis(
                batch
                    .and_then(|b| b.retry_delay_ms)
                    .unwrap_or(DEFAULT_RETRY_DELAY_MS),
            ),
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_file_extension("input.path", &self.input.path, &["csv"])?;
        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_file_extension("output.file", self.output_file(), &["csv"])?;
        if let Some(base_url) = &self.provider.base_url {
            validation::validate_url("provider.base_url", base_url)?;
        }
        if self.provider.timeout_seconds == Some(0) {
            return Err(EmailIntelError::InvalidConfigValueError {
                field: "provider.timeout_seconds".to_string(),
                value: "0".to_string(),
                reason: "Timeout must be at least one second".to_string(),
            });
        }
        self.batch_options().validate()
    }
}
