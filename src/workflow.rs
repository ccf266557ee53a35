//! Wires the production collaborators into the movie digest pipeline.

use crate::{
    broker::{BrokerError, Properties, RestProducer},
    config::Config,
    movies::{MongoDataApiStore, MovieQuery, StoreError},
    pipeline::{CompilationError, END, Pipeline, PipelineBuilder, START},
    stages::{
        LOAD_MOVIES, LoadMoviesStage, PUBLISH_SUMMARY, PublishStage, SUMMARIZE_MOVIES,
        SummarizeStage,
    },
    summarization::{CompletionError, build_completion_client},
};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while building the production pipeline.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The movie store client could not be created.
    #[error("Failed to set up movie store: {0}")]
    Store(#[from] StoreError),
    /// The completion client could not be created.
    #[error("Failed to set up completion client: {0}")]
    Completion(#[from] CompletionError),
    /// The broker producer could not be created.
    #[error("Failed to set up broker producer: {0}")]
    Broker(#[from] BrokerError),
    /// The stage graph failed validation.
    #[error("Invalid pipeline graph: {0}")]
    Graph(#[from] CompilationError),
}

/// Connect the three stages `START -> load_movies -> summarize_movies -> publish_summary -> END`.
pub fn assemble(
    load: LoadMoviesStage,
    summarize: SummarizeStage,
    publish: PublishStage,
) -> Result<Pipeline, CompilationError> {
    PipelineBuilder::new()
        .add_stage(load)
        .add_stage(summarize)
        .add_stage(publish)
        .add_edge(START, LOAD_MOVIES)
        .add_edge(LOAD_MOVIES, SUMMARIZE_MOVIES)
        .add_edge(SUMMARIZE_MOVIES, PUBLISH_SUMMARY)
        .add_edge(PUBLISH_SUMMARY, END)
        .compile()
}

/// Build the pipeline backed by the MongoDB Data API, the configured completion provider,
/// and the Kafka REST producer described by the properties file.
pub fn build_pipeline(config: &Config) -> Result<Pipeline, WorkflowError> {
    let policies = config.failure_policies;

    let store = Arc::new(MongoDataApiStore::new(config)?);
    let load = LoadMoviesStage::new(store, MovieQuery::from_config(config), policies.load);

    let client = Arc::from(build_completion_client(config)?);
    let summarize = SummarizeStage::new(client, config.openai_model.clone(), policies.summarize);

    let properties = Properties::load(&config.kafka_properties_path).map_err(BrokerError::from)?;
    let producer = Arc::new(RestProducer::from_properties(
        &properties,
        config.http_timeout(),
    )?);
    let publish = PublishStage::new(producer, config.topic_name.clone(), policies.publish);

    let pipeline = assemble(load, summarize, publish)?;
    tracing::debug!(stages = ?pipeline.stage_names(), "Pipeline compiled");
    Ok(pipeline)
}
