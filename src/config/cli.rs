use crate::config::{
    resolve_api_key, BatchOptions, ConfigProvider, OutputLayout, ProviderKind, ProviderSettings,
    DEFAULT_DELAY_MS, DEFAULT_MAX_TOKENS, DEFAULT_OUTPUT_FILE, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_TIMEOUT_SECONDS,
};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::{Args, Parser};
use std::path::Path;
use std::time::Duration;

/// Provider selection flags shared by every binary.
#[derive(Debug, Clone, Args)]
pub struct ProviderArgs {
    #[arg(long, value_enum, default_value = "anthropic")]
    pub provider: ProviderKind,

    #[arg(long, help = "Model identifier (defaults to the provider's fast model)")]
    pub model: Option<String>,

    #[arg(long, help = "API key (defaults to the provider's environment variable)")]
    pub api_key: Option<String>,

    #[arg(long, help = "Override the provider's API base URL")]
    pub base_url: Option<String>,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECONDS)]
    pub timeout_seconds: u64,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,
}

impl ProviderArgs {
    pub fn provider_settings(&self) -> Result<ProviderSettings> {
        let api_key = resolve_api_key(self.provider, self.api_key.as_deref())?;
        let settings = ProviderSettings::new(self.provider, api_key)
            .with_model(self.model.clone())
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_seconds))
            .with_max_tokens(self.max_tokens);
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Parser)]
#[command(name = "email-intel")]
#[command(about = "Classify a CSV of emails with a large language model")]
pub struct CliConfig {
    #[arg(long, default_value = "sample_emails.csv", help = "CSV with email_from, subject, body columns")]
    pub input: String,

    #[arg(long, default_value = ".")]
    pub output_path: String,

    #[arg(long, default_value = DEFAULT_OUTPUT_FILE)]
    pub output_file: String,

    #[arg(long, value_enum, default_value = "summary")]
    pub layout: OutputLayout,

    #[command(flatten)]
    pub provider: ProviderArgs,

    #[arg(long, default_value_t = DEFAULT_DELAY_MS, help = "Pause between provider calls")]
    pub delay_ms: u64,

    #[arg(long, default_value_t = 0, help = "Retries after a failed provider call")]
    pub retry_attempts: u32,

    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_MS)]
    pub retry_delay_ms: u64,

    #[arg(long, default_value_t = 3, help = "Number of results to print after the run")]
    pub preview: usize,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub log_json: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl ConfigProvider for CliConfig {
    fn input_file(&self) -> &str {
        &self.input
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_file(&self) -> &str {
        &self.output_file
    }

    fn layout(&self) -> OutputLayout {
        self.layout
    }

    fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            delay: Duration::from_millis(self.delay_ms),
            retry_attempts: self.retry_attempts,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("input", &self.input)?;
        validation::validate_file_extension("input", &self.input, &["csv"])?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_file_extension("output_file", &self.output_file, &["csv"])?;
        self.batch_options().validate()
    }
}

/// Filesystem storage rooted at `base_path`; absolute paths bypass the root.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = tokio::fs::read(full_path).await?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(full_path, data).await?;
        Ok(())
    }
}
