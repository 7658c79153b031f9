use super::{build_client, endpoint, send_json};
use crate::config::ProviderSettings;
use crate::domain::ports::{ProviderError, TextGenerator};
use async_trait::async_trait;
use reqwest::Client;

/// OpenAI-compatible Chat Completions API (OpenAI, Azure, local proxies).
pub struct OpenAiGenerator {
    settings: ProviderSettings,
    label: String,
    client: Client,
}

impl OpenAiGenerator {
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        Ok(Self {
            label: format!("openai/{}", settings.model),
            client: build_client(&settings)?,
            settings,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
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
            .post(endpoint(&self.settings.base_url, "v1/chat/completions"))
            .bearer_auth(&self.settings.api_key)
            .json(&body);

        let json = send_json(request).await?;

        json.pointer("/choices/0/message/content")
            .and_then(|content| content.as_str())
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .ok_or(ProviderError::EmptyResponse)
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

    fn generator(base_url: String) -> OpenAiGenerator {
        let settings = ProviderSettings::new(ProviderKind::OpenAi, "sk-test")
            .with_base_url(Some(base_url))
            .with_model(Some("gpt-4o".to_string()));
        OpenAiGenerator::new(settings).unwrap()
    }

    #[tokio::test]
    async fn test_generate_returns_message_content() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .header("Authorization", "Bearer sk-test")
                .json_body_partial(r#"{"model":"gpt-4o"}"#);
            then.status(200).json_body(serde_json::json!({
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "```json\n{}\n```"}}
                ],
                "usage": {"prompt_tokens": 90, "completion_tokens": 5}
            }));
        });

        let text = generator(server.base_url()).generate("classify").await.unwrap();

        api_mock.assert();
        assert_eq!(text, "```json\n{}\n```");
    }

    #[tokio::test]
    async fn test_rate_limit_is_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(429).json_body(serde_json::json!({
                "error": {"message": "Rate limit reached", "type": "requests"}
            }));
        });

        let err = generator(server.base_url()).generate("classify").await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Api { status: 429, ref message } if message == "Rate limit reached"
        ));
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_parse_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v1/chat/completions");
            then.status(200).body("<html>proxy page</html>");
        });

        let err = generator(server.base_url()).generate("classify").await.unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }
}
