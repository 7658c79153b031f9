use super::{build_client, endpoint, send_json};
use crate::config::ProviderSettings;
use crate::domain::ports::{ProviderError, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

/// Google Gemini `generateContent` API.
pub struct GeminiGenerator {
    settings: ProviderSettings,
    label: String,
    client: Client,
}

impl GeminiGenerator {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            label: format!("gemini/{}", model_id(&settings.model)),
            client: build_client(&settings)?,
            settings,
        })
    }
}

/// Accepts both `gemini-flash-latest` and `models/gemini-flash-latest`.
fn model_id(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "contents": [
                {"role": "user", "parts": [{"text": prompt}]}
            ],
            "generationConfig": {
                "maxOutputTokens": self.settings.max_tokens
            }
        });

        let path = format!(
            "v1beta/models/{}:generateContent",
            model_id(&self.settings.model)
        );
        let request = self
            .client
            .post(endpoint(&self.settings.base_url, &path))
            .header("x-goog-api-key", &self.settings.api_key)
            .json(&body);

        let json = send_json(request).await?;

        // A reply may be split over several parts.
        let text: String = json
            .pointer("/candidates/0/content/parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|part| part.get("text").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderKind;
    use httpmock::prelude::*;

    fn generator(base_url: String, model: &str) -> GeminiGenerator {
        let settings = ProviderSettings::new(ProviderKind::Gemini, "AIza-test")
            .with_base_url(Some(base_url))
            .with_model(Some(model.to_string()));
        GeminiGenerator::new(settings).unwrap()
    }

    #[test]
    fn test_model_prefix_is_stripped() {
        assert_eq!(model_id("models/gemini-flash-latest"), "gemini-flash-latest");
        assert_eq!(model_id("gemini-1.5-flash"), "gemini-1.5-flash");
    }

    #[tokio::test]
    async fn test_generate_joins_parts() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-flash-latest:generateContent")
                .header("x-goog-api-key", "AIza-test");
            then.status(200).json_body(serde_json::json!({
                "candidates": [{
                    "content": {
                        "role": "model",
                        "parts": [{"text": "{\"category\":"}, {"text": "\"Spam\"}"}]
                    },
                    "finishReason": "STOP"
                }]
            }));
        });

        let text = generator(server.base_url(), "models/gemini-flash-latest")
            .generate("classify")
            .await
            .unwrap();

        api_mock.assert();
        assert_eq!(text, "{\"category\":\"Spam\"}");
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_empty_response() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-flash-latest:generateContent");
            then.status(200).json_body(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            }));
        });

        let err = generator(server.base_url(), "gemini-flash-latest")
            .generate("classify")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResponse));
    }

    #[tokio::test]
    async fn test_bad_key_is_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/v1beta/models/gemini-flash-latest:generateContent");
            then.status(400).json_body(serde_json::json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            }));
        });

        let err = generator(server.base_url(), "gemini-flash-latest")
            .generate("classify")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "API error (400): API key not valid");
    }
}
