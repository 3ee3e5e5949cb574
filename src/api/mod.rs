mod types;

use async_trait::async_trait;

pub use types::*;

use crate::config::Config;
use crate::core::PortraitError;
use crate::http_client::HTTP_CLIENT;

/// Anything that can answer a generateContent request
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, PortraitError>;
}

/// Gemini API client
pub struct GeminiClient {
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Create a new client from config
    pub fn from_config(config: &Config) -> Result<Self, PortraitError> {
        let api_key = config
            .api_key()
            .filter(|k| !k.is_empty())
            .ok_or(PortraitError::MissingApiKey)?;

        Ok(Self::new(api_key, config.api.base_url.trim_end_matches('/')))
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateRequest,
    ) -> Result<GenerateResponse, PortraitError> {
        let url = self.endpoint(model);

        tracing::debug!("Sending generate request to: {}", url);
        tracing::debug!("Request body: {}", redacted_json(request));

        let response = HTTP_CLIENT
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("Response status: {}", status);

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(envelope) if envelope.error.status.is_empty() => envelope.error.message,
                Ok(envelope) => format!("{} ({})", envelope.error.message, envelope.error.status),
                Err(_) => body,
            };
            return Err(PortraitError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let response: GenerateResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &response.usage_metadata {
            tracing::debug!(
                prompt_tokens = ?usage.prompt_token_count,
                candidate_tokens = ?usage.candidates_token_count,
                total_tokens = ?usage.total_token_count,
                "Token usage"
            );
        }

        Ok(response)
    }
}

/// Pretty JSON of a request with base64 payloads replaced by their length
fn redacted_json(request: &GenerateRequest) -> String {
    let mut value = match serde_json::to_value(request) {
        Ok(v) => v,
        Err(e) => return format!("<unserializable: {}>", e),
    };
    elide_payloads(&mut value);
    serde_json::to_string_pretty(&value).unwrap_or_default()
}

fn elide_payloads(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                match v {
                    serde_json::Value::String(s) if key == "data" => {
                        *s = format!("<{} base64 chars>", s.len());
                    }
                    _ => elide_payloads(v),
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(elide_payloads),
        _ => {}
    }
}
