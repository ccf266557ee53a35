//! Abstractions for generating the movie digest via a hosted or local model.
//!
//! The summarize stage talks to a [`CompletionClient`]; the concrete client is chosen from
//! `SUMMARY_PROVIDER`. Both adapters issue plain HTTP requests with `reqwest` and never retry.

use crate::config::{Config, SummaryProvider};
use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

mod ollama;
mod openai;
pub mod prompt;

pub use ollama::OllamaCompletionClient;
pub use openai::OpenAiCompletionClient;

/// Sampling temperature used for every digest request.
pub const SUMMARY_TEMPERATURE: f64 = 0.7;

/// Errors surfaced while requesting a completion.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Provider was misconfigured or unreachable.
    #[error("Completion provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate completion: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Request payload passed to the completion provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier understood by the provider.
    pub model: String,
    /// Single user-role prompt.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f64,
}

/// Interface implemented by text generation providers.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate text for the prompt, returning the provider's response verbatim.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError>;
}

/// Build the completion client selected by configuration.
pub fn build_completion_client(
    config: &Config,
) -> Result<Box<dyn CompletionClient>, CompletionError> {
    let http = http_client(config)?;
    match config.summary_provider {
        SummaryProvider::OpenAI => {
            let api_key = config.openai_api_key.clone().ok_or_else(|| {
                CompletionError::ProviderUnavailable("OPENAI_API_KEY is not set".into())
            })?;
            Ok(Box::new(OpenAiCompletionClient::new(
                http,
                config.openai_base_url.clone(),
                api_key,
            )))
        }
        SummaryProvider::Ollama => Ok(Box::new(OllamaCompletionClient::new(
            http,
            config.ollama_url.clone(),
        ))),
    }
}

fn http_client(config: &Config) -> Result<Client, CompletionError> {
    Client::builder()
        .user_agent("movie-digest/summary")
        .timeout(config.http_timeout())
        .build()
        .map_err(|error| {
            CompletionError::ProviderUnavailable(format!("failed to build HTTP client: {error}"))
        })
}
