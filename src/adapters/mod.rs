// Adapters layer: concrete text-generation providers behind `TextGenerator`.

pub mod anthropic;
pub mod gemini;
pub mod openai;

pub use anthropic::AnthropicGenerator;
pub use gemini::GeminiGenerator;
pub use openai::OpenAiGenerator;

use crate::config::{ProviderKind, ProviderSettings};
use crate::domain::ports::{ProviderError, TextGenerator};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

/// Build the generator selected by `settings.kind`.
pub fn create_generator(
    settings: ProviderSettings,
) -> Result<Box<dyn TextGenerator>, ProviderError> {
    tracing::debug!("Creating provider: {:?}", settings);
    Ok(match settings.kind {
        ProviderKind::Anthropic => Box::new(AnthropicGenerator::new(settings)?),
        ProviderKind::OpenAi => Box::new(OpenAiGenerator::new(settings)?),
        ProviderKind::Gemini => Box::new(GeminiGenerator::new(settings)?),
    })
}

fn build_client(settings: &ProviderSettings) -> Result<Client, ProviderError> {
    Ok(Client::builder().timeout(settings.timeout).build()?)
}

/// Send a request and decode a successful JSON body; non-2xx statuses
/// become [`ProviderError::Api`] carrying the provider's message.
async fn send_json(request: RequestBuilder) -> Result<Value, ProviderError> {
    let response = request.send().await?;
    let status = response.status();
    tracing::debug!("Provider response status: {}", status);

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Api {
            status: status.as_u16(),
            message: api_error_message(&body),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ProviderError::Parse(e.to_string()))
}

/// `error.message` (Anthropic, OpenAI, Gemini all use it), else the body head.
fn api_error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let message = parsed.as_ref().and_then(|json| {
        let error = json.get("error")?;
        error
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| error.as_str())
            .map(str::to_string)
    });

    message.unwrap_or_else(|| {
        let head: String = body.chars().take(200).collect();
        if head.is_empty() {
            "no response body".to_string()
        } else {
            head
        }
    })
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}
