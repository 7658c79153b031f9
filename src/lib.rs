pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{CliConfig, LocalStorage, ProviderArgs};

pub use adapters::create_generator;
pub use config::{BatchOptions, OutputLayout, ProviderKind, ProviderSettings};
pub use core::{
    classifier::BatchClassifier,
    engine::{ClassifyEngine, RunReport},
    pipeline::EmailPipeline,
};
pub use domain::model::{Batch, Category, ClassificationResult, InputRecord, Urgency};
pub use domain::ports::{ProviderError, TextGenerator};
pub use utils::error::{EmailIntelError, Result};
