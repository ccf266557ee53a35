use super::LOAD_MOVIES;
use crate::{
    config::FailurePolicy,
    movies::{MovieQuery, MovieStore},
    pipeline::{PipelineState, Stage, StageError, StateUpdate},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Loads the highest rated movies matching the configured query.
pub struct LoadMoviesStage {
    store: Arc<dyn MovieStore>,
    query: MovieQuery,
    policy: FailurePolicy,
}

impl LoadMoviesStage {
    /// Create the stage. Under [`FailurePolicy::Degrade`] a store failure yields no movies.
    pub fn new(store: Arc<dyn MovieStore>, query: MovieQuery, policy: FailurePolicy) -> Self {
        Self {
            store,
            query,
            policy,
        }
    }
}

#[async_trait]
impl Stage for LoadMoviesStage {
    fn name(&self) -> &str {
        LOAD_MOVIES
    }

    async fn run(&self, _state: &PipelineState) -> Result<StateUpdate, StageError> {
        match self.store.find_movies(&self.query).await {
            Ok(movies) => {
                tracing::info!(movies = movies.len(), "Loaded movies");
                Ok(StateUpdate::with_movies(movies))
            }
            Err(error) => match self.policy {
                FailurePolicy::Abort => Err(error.into()),
                FailurePolicy::Degrade => {
                    tracing::warn!(%error, "Movie store unavailable; continuing with no movies");
                    Ok(StateUpdate::with_movies(Vec::new()))
                }
            },
        }
    }
}
