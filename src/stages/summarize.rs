use super::SUMMARIZE_MOVIES;
use crate::{
    config::FailurePolicy,
    pipeline::{PipelineState, Stage, StageError, StateUpdate},
    summarization::{
        CompletionClient, CompletionRequest, SUMMARY_TEMPERATURE,
        prompt::{build_digest_prompt, build_movie_listing},
    },
};
use async_trait::async_trait;
use std::sync::Arc;

/// Summary produced when there is nothing to summarize.
pub const NO_MOVIES_SUMMARY: &str = "No movies found to summarize.";

/// Summary produced when generation fails under [`FailurePolicy::Degrade`].
pub const DEGRADED_SUMMARY: &str = "Summary unavailable.";

/// Asks the completion provider for a digest of the loaded movies.
pub struct SummarizeStage {
    client: Arc<dyn CompletionClient>,
    model: String,
    policy: FailurePolicy,
}

impl SummarizeStage {
    /// Create the stage for `model`.
    pub fn new(
        client: Arc<dyn CompletionClient>,
        model: impl Into<String>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            client,
            model: model.into(),
            policy,
        }
    }
}

#[async_trait]
impl Stage for SummarizeStage {
    fn name(&self) -> &str {
        SUMMARIZE_MOVIES
    }

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate, StageError> {
        let movies = state.movies();
        if movies.is_empty() {
            tracing::info!("No movies to summarize");
            return Ok(StateUpdate::with_summary(NO_MOVIES_SUMMARY));
        }

        let listing = build_movie_listing(movies);
        let request = CompletionRequest {
            model: self.model.clone(),
            prompt: build_digest_prompt(&listing),
            temperature: SUMMARY_TEMPERATURE,
        };
        tracing::debug!(
            movies = movies.len(),
            listing_chars = listing.chars().count(),
            model = %request.model,
            "Requesting digest"
        );

        match self.client.complete(request).await {
            Ok(summary) => {
                tracing::info!(chars = summary.chars().count(), "Generated digest");
                Ok(StateUpdate::with_summary(summary))
            }
            Err(error) => match self.policy {
                FailurePolicy::Abort => Err(error.into()),
                FailurePolicy::Degrade => {
                    tracing::warn!(%error, "Digest generation failed; publishing placeholder");
                    Ok(StateUpdate::with_summary(DEGRADED_SUMMARY))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::test_support::sample_movie;
    use crate::summarization::{CompletionError, prompt::PROMPT_BODY_CHAR_BUDGET};
    use std::sync::Mutex;

    struct StubClient {
        reply: Option<String>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl StubClient {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.into()),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().expect("lock").len()
        }
    }

    #[async_trait]
    impl CompletionClient for StubClient {
        async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
            self.requests.lock().expect("lock").push(request);
            self.reply
                .clone()
                .ok_or_else(|| CompletionError::GenerationFailed("quota exceeded".into()))
        }
    }

    #[tokio::test]
    async fn empty_movies_short_circuit_without_calling_model() {
        let client = Arc::new(StubClient::replying("unused"));
        let stage = SummarizeStage::new(client.clone(), "gpt-test", FailurePolicy::Abort);

        let update = stage.run(&PipelineState::initial()).await.expect("update");
        assert_eq!(update.summary.as_deref(), Some(NO_MOVIES_SUMMARY));
        assert!(update.movies.is_none());

        let update = stage.run(&PipelineState::default()).await.expect("update");
        assert_eq!(update.summary.as_deref(), Some(NO_MOVIES_SUMMARY));
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn sends_one_request_with_model_and_temperature() {
        let client = Arc::new(StubClient::replying("Top picks: Heat"));
        let stage = SummarizeStage::new(client.clone(), "gpt-test", FailurePolicy::Abort);
        let state = PipelineState::new(vec![sample_movie("Heat"), sample_movie("Ran")], "");

        let update = stage.run(&state).await.expect("update");

        assert_eq!(update.summary.as_deref(), Some("Top picks: Heat"));
        let requests = client.requests.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "gpt-test");
        assert_eq!(requests[0].temperature, SUMMARY_TEMPERATURE);
        assert!(requests[0].prompt.contains("- \"Heat\": Heat plot."));
        assert!(requests[0].prompt.contains("- \"Ran\": Ran plot."));
    }

    #[tokio::test]
    async fn oversize_descriptions_are_capped_in_prompt() {
        let client = Arc::new(StubClient::replying("ok"));
        let stage = SummarizeStage::new(client.clone(), "gpt-test", FailurePolicy::Abort);
        let movies = (0..10)
            .map(|i| {
                let mut movie = sample_movie(&format!("Long {i}"));
                movie.fullplot = Some("y".repeat(2_000));
                movie
            })
            .collect();

        stage
            .run(&PipelineState::new(movies, ""))
            .await
            .expect("update");

        let requests = client.requests.lock().expect("lock");
        let prompt = &requests[0].prompt;
        let (_, body) = prompt
            .split_once("Movies from our database:\n")
            .expect("listing marker");
        assert_eq!(body.chars().count(), PROMPT_BODY_CHAR_BUDGET);
    }

    #[tokio::test]
    async fn generation_failure_aborts_by_default() {
        let stage = SummarizeStage::new(
            Arc::new(StubClient::failing()),
            "gpt-test",
            FailurePolicy::Abort,
        );
        let state = PipelineState::new(vec![sample_movie("Heat")], "");

        let error = stage.run(&state).await.expect_err("abort");
        assert!(matches!(error, StageError::Completion(_)));
    }

    #[tokio::test]
    async fn generation_failure_degrades_to_placeholder() {
        let stage = SummarizeStage::new(
            Arc::new(StubClient::failing()),
            "gpt-test",
            FailurePolicy::Degrade,
        );
        let state = PipelineState::new(vec![sample_movie("Heat")], "");

        let update = stage.run(&state).await.expect("update");
        assert_eq!(update.summary.as_deref(), Some(DEGRADED_SUMMARY));
    }
}
