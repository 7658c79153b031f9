use crate::config::BatchOptions;
use crate::core::extract::extract_classification;
use crate::core::prompt::build_prompt;
use crate::domain::model::{Batch, ClassificationResult, InputRecord};
use crate::domain::ports::{ProviderError, TextGenerator};

/// Classifies e-mails one at a time through a [`TextGenerator`].
///
/// Only one provider call is ever in flight. Per-record failures (provider
/// errors and unparseable replies) end up in the record's result; they never
/// stop the batch.
pub struct BatchClassifier<G: TextGenerator> {
    generator: G,
    options: BatchOptions,
}

impl<G: TextGenerator> BatchClassifier<G> {
    pub fn new(generator: G, options: BatchOptions) -> Self {
        Self { generator, options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Classify `records` in order. The returned batch has one entry per
    /// record, at the same position.
    pub async fn classify(&self, records: Vec<InputRecord>) -> Batch {
        let total = records.len();
        let mut batch = Batch::with_capacity(total);

        tracing::info!(
            "🤖 Classifying {} emails with {} (delay {:?}, retries {})",
            total,
            self.generator.name(),
            self.options.delay,
            self.options.retry_attempts
        );

        for (index, record) in records.into_iter().enumerate() {
            tracing::info!("📧 Analyzing email {} / {}...", index + 1, total);

            let (result, provider_failed) = self.classify_record(&record).await;
            if provider_failed {
                tracing::warn!("   ❌ Provider call failed: {}", result.raw);
            } else if result.parse_error {
                tracing::warn!("   ⚠️ Reply was not valid JSON, raw text kept");
            } else {
                tracing::info!("   ✅ Completed");
            }

            batch.push(record, result, provider_failed);

            if index + 1 < total && !self.options.delay.is_zero() {
                tokio::time::sleep(self.options.delay).await;
            }
        }

        tracing::info!(
            "📊 {} parsed, {} unparseable replies, {} provider failures",
            batch.stats.parsed,
            batch.stats.parse_failures,
            batch.stats.provider_failures
        );

        batch
    }

    /// Classify a single e-mail with the same retry policy as [`classify`](Self::classify).
    pub async fn classify_one(&self, record: &InputRecord) -> ClassificationResult {
        self.classify_record(record).await.0
    }

    /// Returns the result and whether the provider call itself failed.
    async fn classify_record(&self, record: &InputRecord) -> (ClassificationResult, bool) {
        let prompt = build_prompt(record);
        match self.generate_with_retry(&prompt).await {
            Ok(text) => (extract_classification(&text), false),
            Err(e) => (ClassificationResult::provider_failure(&e), true),
        }
    }

    async fn generate_with_retry(&self, prompt: &str) -> Result<String, ProviderError> {
        let mut attempt = 0;
        loop {
            match self.generator.generate(prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if attempt < self.options.retry_attempts => {
                    attempt += 1;
                    tracing::warn!(
                        "   🔁 Provider call failed ({}), retry {}/{}",
                        e,
                        attempt,
                        self.options.retry_attempts
                    );
                    if !self.options.retry_delay.is_zero() {
                        tokio::time::sleep(self.options.retry_delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }
}
