pub mod classifier;
pub mod engine;
pub mod extract;
pub mod pipeline;
pub mod prompt;
pub mod table;

pub use crate::domain::model::{Batch, ClassificationResult, InputRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage, TextGenerator};
pub use crate::utils::error::Result;
