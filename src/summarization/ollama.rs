use super::{CompletionClient, CompletionError, CompletionRequest};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

/// Completion client for a local Ollama runtime (`/api/generate`, non-streaming).
pub struct OllamaCompletionClient {
    http: Client,
    base_url: String,
}

impl OllamaCompletionClient {
    /// Wrap an HTTP client pointed at the Ollama base URL.
    pub fn new(http: Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl CompletionClient for OllamaCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        let payload = json!({
            "model": request.model,
            "prompt": request.prompt,
            "stream": false,
            "options": {
                "temperature": request.temperature,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                CompletionError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(CompletionError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            CompletionError::InvalidResponse(format!("failed to decode Ollama response: {error}"))
        })?;

        if !body.done {
            return Err(CompletionError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client(base_url: String) -> OllamaCompletionClient {
        OllamaCompletionClient::new(
            Client::builder()
                .user_agent("movie-digest-test")
                .build()
                .expect("client"),
            base_url,
        )
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "llama3".into(),
            prompt: "Summarize".into(),
            temperature: 0.7,
        }
    }

    #[tokio::test]
    async fn handles_successful_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .json_body_partial(r#"{"model": "llama3", "stream": false}"#);
                then.status(200).json_body(json!({
                    "response": "Digest text",
                    "done": true
                }));
            })
            .await;

        let text = client(server.base_url())
            .complete(request())
            .await
            .expect("completion");

        mock.assert_async().await;
        assert_eq!(text, "Digest text");
    }

    #[tokio::test]
    async fn maps_error_status_to_generation_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("boom");
            })
            .await;

        let error = client(server.base_url())
            .complete(request())
            .await
            .expect_err("error response");

        assert!(
            matches!(error, CompletionError::GenerationFailed(ref message) if message.contains("500"))
        );
    }

    #[tokio::test]
    async fn rejects_incomplete_response() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({ "response": "partial", "done": false }));
            })
            .await;

        let error = client(server.base_url())
            .complete(request())
            .await
            .expect_err("incomplete response");

        assert!(matches!(error, CompletionError::InvalidResponse(_)));
    }
}
