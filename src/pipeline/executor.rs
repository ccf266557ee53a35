//! Sequential driver for a compiled [`Pipeline`].

use crate::{
    metrics::{RunMetrics, RunReport},
    pipeline::{graph::Pipeline, stage::StageError, state::PipelineState},
};
use std::time::Instant;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

/// Errors that abort a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage returned an error; later stages did not run.
    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        /// Name of the failing stage.
        stage: String,
        /// Error returned by the stage.
        #[source]
        source: StageError,
    },
}

impl Pipeline {
    /// Run every stage in chain order starting from `initial` and return the final state.
    pub async fn invoke(&self, initial: PipelineState) -> Result<PipelineState, PipelineError> {
        self.invoke_with_metrics(initial)
            .await
            .map(|(state, _)| state)
    }

    /// Run the chain and also return per-stage timings.
    ///
    /// Each stage sees the state produced by merging every earlier stage's update into
    /// `initial`. The first stage error stops the run.
    pub async fn invoke_with_metrics(
        &self,
        initial: PipelineState,
    ) -> Result<(PipelineState, RunReport), PipelineError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("pipeline_run", %run_id);

        async move {
            let mut metrics = RunMetrics::start();
            let mut state = initial;
            tracing::info!(stages = self.stages.len(), "Pipeline run started");

            for stage in &self.stages {
                let name = stage.name();
                let started = Instant::now();
                let update = stage
                    .run(&state)
                    .instrument(tracing::info_span!("stage", stage = name))
                    .await
                    .map_err(|source| {
                        tracing::error!(stage = name, error = %source, "Stage failed");
                        PipelineError::Stage {
                            stage: name.to_string(),
                            source,
                        }
                    })?;

                let elapsed = started.elapsed();
                tracing::debug!(
                    stage = name,
                    fields = ?update.fields(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Merging stage update"
                );
                state = state.merge(update);
                metrics.record_stage(name, elapsed);
            }

            let report = metrics.finish();
            tracing::info!(
                elapsed_ms = report.total_elapsed_ms as u64,
                "Pipeline run complete"
            );
            Ok((state, report))
        }
        .instrument(span)
        .await
    }
}
