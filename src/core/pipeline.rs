use crate::core::classifier::BatchClassifier;
use crate::core::table;
use crate::core::{Batch, ConfigProvider, InputRecord, Pipeline, Storage, TextGenerator};
use crate::utils::error::Result;
use std::path::Path;

/// CSV in, classified CSV out.
pub struct EmailPipeline<S: Storage, C: ConfigProvider, G: TextGenerator> {
    storage: S,
    config: C,
    classifier: BatchClassifier<G>,
}

impl<S: Storage, C: ConfigProvider, G: TextGenerator> EmailPipeline<S, C, G> {
    pub fn new(storage: S, config: C, generator: G) -> Self {
        let options = config.batch_options();
        Self {
            storage,
            config,
            classifier: BatchClassifier::new(generator, options),
        }
    }

    pub fn config(&self) -> &C {
        &self.config
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider, G: TextGenerator> Pipeline for EmailPipeline<S, C, G> {
    async fn extract(&self) -> Result<Vec<InputRecord>> {
        let input = self.config.input_file();
        tracing::debug!("Reading input table: {}", input);
        let data = self
            .storage
            .read_file(input)
            .await
            .map_err(|e| e.reading_input(input))?;
        table::read_records(&data)
    }

    async fn transform(&self, records: Vec<InputRecord>) -> Result<Batch> {
        Ok(self.classifier.classify(records).await)
    }

    async fn load(&self, batch: &Batch) -> Result<String> {
        let output = table::write_table(batch, self.config.layout())?;

        tracing::debug!(
            "Writing {} rows ({} bytes) as {:?}",
            batch.len(),
            output.len(),
            self.config.layout()
        );
        let output_path = Path::new(self.config.output_path())
            .join(self.config.output_file())
            .to_string_lossy()
            .into_owned();
        self.storage.write_file(&output_path, &output).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BatchOptions, OutputLayout};
    use crate::domain::ports::ProviderError;
    use crate::utils::error::EmailIntelError;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_file(path: &str, data: &[u8]) -> Self {
            let mut files = HashMap::new();
            files.insert(path.to_string(), data.to_vec());
            Self {
                files: Arc::new(Mutex::new(files)),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                EmailIntelError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        layout: OutputLayout,
    }

    impl ConfigProvider for MockConfig {
        fn input_file(&self) -> &str {
            "emails.csv"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn output_file(&self) -> &str {
            "results.csv"
        }

        fn layout(&self) -> OutputLayout {
            self.layout
        }

        fn batch_options(&self) -> BatchOptions {
            BatchOptions::immediate()
        }
    }

    /// Answers every prompt with a Customer classification.
    #[derive(Default)]
    struct CountingGenerator {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl TextGenerator for CountingGenerator {
        async fn generate(&self, _prompt: &str) -> std::result::Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(r#"Here you go: {"category":"Customer","urgency":"Medium","intent":"Asks about invoice","suggested_action":"Forward to billing"}"#.to_string())
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    const INPUT: &[u8] = b"email_from,subject,body\nana@acme.io,Invoice,Where is my invoice?\nbob@corp.com,Invoice again,Still waiting\n";

    #[tokio::test]
    async fn test_extract_reads_records() {
        let storage = MockStorage::with_file("emails.csv", INPUT);
        let config = MockConfig {
            layout: OutputLayout::Summary,
        };
        let pipeline = EmailPipeline::new(storage, config, CountingGenerator::default());

        let records = pipeline.extract().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].sender, "bob@corp.com");
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let storage = MockStorage::with_file("other.csv", INPUT);
        let config = MockConfig {
            layout: OutputLayout::Summary,
        };
        let pipeline = EmailPipeline::new(storage, config, CountingGenerator::default());

        let err = pipeline.extract().await.unwrap_err();
        assert!(matches!(
            &err,
            EmailIntelError::InputReadError { path, .. } if path == "emails.csv"
        ));
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_transform_and_load_expanded() {
        let storage = MockStorage::with_file("emails.csv", INPUT);
        let config = MockConfig {
            layout: OutputLayout::Expanded,
        };
        let pipeline = EmailPipeline::new(storage.clone(), config, CountingGenerator::default());

        let records = pipeline.extract().await.unwrap();
        let batch = pipeline.transform(records).await.unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.stats.parsed, 2);
        assert_eq!(
            pipeline.classifier.generator().calls.load(Ordering::SeqCst),
            2
        );

        let output_path = pipeline.load(&batch).await.unwrap();
        assert_eq!(
            output_path,
            Path::new("test_output").join("results.csv").to_string_lossy()
        );

        let written = storage.get_file(&output_path).await.unwrap();
        let text = String::from_utf8(written).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "From,Category,Urgency,Intent,Suggested Action,Error");
        assert_eq!(
            lines[1],
            "ana@acme.io,Customer,Medium,Asks about invoice,Forward to billing,"
        );
        assert_eq!(lines.len(), 3);
    }
}
