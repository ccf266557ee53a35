//! The three stages of the movie digest pipeline.

mod load;
mod publish;
mod summarize;

pub use load::LoadMoviesStage;
pub use publish::{PublishStage, SUMMARY_FALLBACK};
pub use summarize::{DEGRADED_SUMMARY, NO_MOVIES_SUMMARY, SummarizeStage};

/// Name of the stage that loads movies from the store.
pub const LOAD_MOVIES: &str = "load_movies";
/// Name of the stage that turns movies into a digest.
pub const SUMMARIZE_MOVIES: &str = "summarize_movies";
/// Name of the stage that publishes the digest.
pub const PUBLISH_SUMMARY: &str = "publish_summary";
