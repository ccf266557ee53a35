//! Working memory threaded through the pipeline and its merge rule.

use crate::movies::Movie;

/// Fields known to the pipeline for a single run.
///
/// A field is `None` until some stage (or the caller's initial state) sets it. Stages never
/// mutate the state directly; they return a [`StateUpdate`] that the executor merges in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineState {
    /// Movies selected by the load stage.
    pub movies: Option<Vec<Movie>>,
    /// Digest text produced by the summarize stage.
    pub summary: Option<String>,
}

/// Partial state returned by a stage: only the fields it computed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateUpdate {
    /// Replacement for [`PipelineState::movies`].
    pub movies: Option<Vec<Movie>>,
    /// Replacement for [`PipelineState::summary`].
    pub summary: Option<String>,
}

impl PipelineState {
    /// Build a state with both fields set.
    pub fn new(movies: Vec<Movie>, summary: impl Into<String>) -> Self {
        Self {
            movies: Some(movies),
            summary: Some(summary.into()),
        }
    }

    /// State the process entry point starts from: no movies and an empty summary.
    pub fn initial() -> Self {
        Self::new(Vec::new(), "")
    }

    /// Movies loaded so far; empty when the field was never set.
    pub fn movies(&self) -> &[Movie] {
        self.movies.as_deref().unwrap_or(&[])
    }

    /// Summary text, if any stage has produced one.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Shallow-merge `update` into this state.
    ///
    /// Every field set in `update` replaces the current value; every other field is kept.
    /// Nothing is ever removed.
    pub fn merge(mut self, update: StateUpdate) -> Self {
        let StateUpdate { movies, summary } = update;
        if movies.is_some() {
            self.movies = movies;
        }
        if summary.is_some() {
            self.summary = summary;
        }
        self
    }
}

impl StateUpdate {
    /// An update that changes nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Update carrying a new movie list.
    pub fn with_movies(movies: Vec<Movie>) -> Self {
        Self {
            movies: Some(movies),
            ..Self::default()
        }
    }

    /// Update carrying a new summary.
    pub fn with_summary(summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..Self::default()
        }
    }

    /// Names of the fields this update sets, for logging.
    pub fn fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.movies.is_some() {
            fields.push("movies");
        }
        if self.summary.is_some() {
            fields.push("summary");
        }
        fields
    }

    /// Whether the update sets no field at all.
    pub fn is_empty(&self) -> bool {
        self.movies.is_none() && self.summary.is_none()
    }
}
