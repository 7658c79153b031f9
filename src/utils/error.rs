use crate::domain::ports::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmailIntelError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Provider error: {0}")]
    ProviderError(#[from] ProviderError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Cannot read input table '{path}': {source}")]
    InputReadError {
        path: String,
        source: std::io::Error,
    },

    #[error("Input table is missing required columns: {}", missing.join(", "))]
    MissingColumnsError { missing: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Provider,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EmailIntelError {
    /// Re-tag an I/O failure on `path` as an input error. Other errors pass through.
    pub fn reading_input(self, path: &str) -> Self {
        match self {
            Self::IoError(source) => Self::InputReadError {
                path: path.to_string(),
                source,
            },
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::CsvError(_)
            | Self::InputReadError { .. }
            | Self::MissingColumnsError { .. } => ErrorCategory::Input,
            Self::ProviderError(_) => ErrorCategory::Provider,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Provider => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::CsvError(_) => {
                "Check that the input file is valid CSV with a header row".to_string()
            }
            Self::InputReadError { path, .. } => {
                format!("Check that '{}' exists and is readable, or pass --input", path)
            }
            Self::MissingColumnsError { .. } => {
                "The input header must contain email_from, subject and body".to_string()
            }
            Self::IoError(_) => "Check that the paths exist and are writable".to_string(),
            Self::SerializationError(_) => "Re-run with --verbose to inspect the data".to_string(),
            Self::ProviderError(_) => {
                "Check the API key, model name and network connectivity".to_string()
            }
            Self::MissingConfigError { field } if field == "api_key" => {
                "Pass --api-key or set the provider's API key environment variable".to_string()
            }
            Self::MissingConfigError { field } => format!("Provide a value for '{}'", field),
            Self::InvalidConfigValueError { field, .. } => {
                format!("Correct the value of '{}'", field)
            }
            Self::ConfigError { .. } => "Review the configuration file".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Input => format!("Could not read input emails: {}", self),
            ErrorCategory::Provider => format!("Model provider failed: {}", self),
            ErrorCategory::Output => format!("Could not write results: {}", self),
        }
    }
}

impl From<toml::de::Error> for EmailIntelError {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("TOML parsing error: {}", e),
        }
    }
}

pub type Result<T> = std::result::Result<T, EmailIntelError>;
