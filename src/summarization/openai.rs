use super::{CompletionClient, CompletionError, CompletionRequest};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

/// Completion client for an OpenAI-compatible chat completions endpoint.
pub struct OpenAiCompletionClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiCompletionClient {
    /// Wrap an HTTP client pointed at `base_url` (for example `https://api.openai.com/v1`).
    pub fn new(http: Client, base_url: String, api_key: String) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let payload = json!({
            "model": request.model,
            "temperature": request.temperature,
            "messages": [
                { "role": "user", "content": request.prompt }
            ]
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                CompletionError::ProviderUnavailable(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::ProviderUnavailable(format!(
                "{} returned {status}: {body}",
                self.endpoint()
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::GenerationFailed(format!(
                "chat completion returned {status}: {body}"
            )));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            CompletionError::InvalidResponse(format!(
                "failed to decode chat completion response: {error}"
            ))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                CompletionError::InvalidResponse("chat completion returned no content".into())
            })
    }
}
