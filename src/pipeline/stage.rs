//! Stage contract: a named transformation from the current state to a partial update.

use crate::{
    broker::BrokerError,
    movies::StoreError,
    pipeline::state::{PipelineState, StateUpdate},
    summarization::CompletionError,
};
use async_trait::async_trait;
use thiserror::Error;

/// Errors a stage may surface to the executor.
///
/// Whether a collaborator failure ends up here depends on the stage's failure policy.
#[derive(Debug, Error)]
pub enum StageError {
    /// The movie store could not be queried.
    #[error("Movie store query failed: {0}")]
    Store(#[from] StoreError),
    /// The completion provider failed to produce a summary.
    #[error("Summary generation failed: {0}")]
    Completion(#[from] CompletionError),
    /// The broker could not accept the message.
    #[error("Broker request failed: {0}")]
    Broker(#[from] BrokerError),
    /// One or more enqueued messages were not acknowledged.
    #[error("{failed} of {total} message(s) were not delivered: {reason}")]
    Delivery {
        /// Number of failed deliveries.
        failed: usize,
        /// Number of messages flushed.
        total: usize,
        /// First failure reported by the broker.
        reason: String,
    },
}

/// A single named unit of work in the pipeline.
///
/// Implementations read only what earlier stages produce, perform at most one external call
/// without retrying, and return just the fields they computed.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Unique name used to wire the stage into the graph.
    fn name(&self) -> &str;

    /// Compute this stage's contribution from the current state.
    async fn run(&self, state: &PipelineState) -> Result<StateUpdate, StageError>;
}

/// Stage backed by a plain synchronous function.
pub struct FnStage<F> {
    name: String,
    transform: F,
}

impl<F> FnStage<F>
where
    F: Fn(&PipelineState) -> Result<StateUpdate, StageError> + Send + Sync,
{
    /// Wrap `transform` as a stage registered under `name`.
    pub fn new(name: impl Into<String>, transform: F) -> Self {
        Self {
            name: name.into(),
            transform,
        }
    }
}

#[async_trait]
impl<F> Stage for FnStage<F>
where
    F: Fn(&PipelineState) -> Result<StateUpdate, StageError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate, StageError> {
        (self.transform)(state)
    }
}
