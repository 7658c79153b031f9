use crate::core::{Batch, Pipeline};
use crate::utils::error::Result;

/// Outcome of a completed run.
#[derive(Debug)]
pub struct RunReport {
    pub output_path: String,
    pub batch: Batch,
}

pub struct ClassifyEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> ClassifyEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Read the input, classify every record, then write the table once.
    ///
    /// Input errors abort before the first provider call; nothing is written.
    pub async fn run(&self) -> Result<RunReport> {
        tracing::info!("📥 Reading input emails...");
        let records = self.pipeline.extract().await?;
        tracing::info!("📥 Loaded {} emails", records.len());

        let batch = self.pipeline.transform(records).await?;

        tracing::info!("💾 Writing {} results...", batch.len());
        let output_path = self.pipeline.load(&batch).await?;
        tracing::info!("💾 Results saved to: {}", output_path);

        Ok(RunReport { output_path, batch })
    }
}
