#![deny(missing_docs)]

//! Core library for the Movie Digest pipeline.

/// Message broker producer and properties loading.
pub mod broker;
/// Environment-driven configuration management.
pub mod config;
/// Structured logging and tracing setup.
pub mod logging;
/// Run timing helpers.
pub mod metrics;
/// Movie document store integration.
pub mod movies;
/// Stage graph, shared state, and the sequential executor.
pub mod pipeline;
/// The load, summarize, and publish stages.
pub mod stages;
/// Completion providers and prompt assembly.
pub mod summarization;
/// Production wiring of stages and collaborators.
pub mod workflow;
