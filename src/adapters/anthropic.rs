use super::{build_client, endpoint, send_json};
use crate::config::ProviderSettings;
use crate::domain::ports::{ProviderError, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

const API_VERSION: &str = "2023-06-01";

/// Anthropic Messages API.
pub struct AnthropicGenerator {
    settings: ProviderSettings,
    label: String,
    client: Client,
}

impl AnthropicGenerator {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            label: format!("anthropic/{}", settings.model),
            client: build_client(&settings)?,
            settings,
        })
    }
}

#[async_trait]
impl TextGenerator for AnthropicGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "messages": [
                {"role": "user", "content": prompt}
            ]
        });

        let request = self
            .client
            .post(endpoint(&self.settings.base_url, "v1/messages"))
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body);

        let json = send_json(request).await?;

        json.get("content")
            .and_then(Value::as_array)
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find_map(|block| block.get("text").and_then(Value::as_str))
            })
            .map(str::to_string)
            .ok_or(ProviderError::EmptyResponse)
    }

    fn name(&self) -> &str {
        &self.label
    }
}
