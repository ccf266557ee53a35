use std::time::{Duration, Instant};

/// Timings collected while a single pipeline run executes.
#[derive(Debug)]
pub struct RunMetrics {
    started: Instant,
    stages: Vec<StageTiming>,
}

impl RunMetrics {
    /// Start timing a run.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            stages: Vec::new(),
        }
    }

    /// Record that `stage` finished after `elapsed`.
    pub fn record_stage(&mut self, stage: &str, elapsed: Duration) {
        self.stages.push(StageTiming {
            stage: stage.to_string(),
            elapsed_ms: elapsed.as_millis(),
        });
    }

    /// Close the run and return an immutable report.
    pub fn finish(self) -> RunReport {
        RunReport {
            total_elapsed_ms: self.started.elapsed().as_millis(),
            stages: self.stages,
        }
    }
}

/// Wall time spent in one stage.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StageTiming {
    /// Stage name.
    pub stage: String,
    /// Milliseconds between the stage starting and its update being merged.
    pub elapsed_ms: u128,
}

/// Immutable view of a finished run used for reporting.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RunReport {
    /// Milliseconds from the first stage starting to the last merge.
    pub total_elapsed_ms: u128,
    /// Per-stage timings in execution order.
    pub stages: Vec<StageTiming>,
}

impl RunReport {
    /// Stage names in the order they ran.
    pub fn stage_order(&self) -> Vec<&str> {
        self.stages.iter().map(|timing| timing.stage.as_str()).collect()
    }
}
