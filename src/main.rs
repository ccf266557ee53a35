use anyhow::Context;
use moviedigest::{config, logging, pipeline::PipelineState, workflow};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let _log_guard = logging::init_tracing();

    let config = config::init_config().context("Failed to load configuration")?;
    let pipeline = workflow::build_pipeline(&config).context("Failed to build pipeline")?;

    let (state, report) = pipeline
        .invoke_with_metrics(PipelineState::initial())
        .await
        .context("Pipeline run aborted")?;

    tracing::info!(
        summary = state.summary().unwrap_or_default(),
        "Final digest"
    );
    match serde_json::to_string(&report) {
        Ok(report) => tracing::info!(%report, "Run metrics"),
        Err(error) => tracing::warn!(%error, "Failed to serialize run metrics"),
    }
    Ok(())
}
