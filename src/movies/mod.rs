//! Movie document store integration.

use async_trait::async_trait;

pub mod client;
pub mod query;
pub mod types;

pub use client::MongoDataApiStore;
pub use query::MovieQuery;
pub use types::{MISSING_DESCRIPTION, Movie, StoreError};

/// Read access to the movie collection.
#[async_trait]
pub trait MovieStore: Send + Sync {
    /// Return up to `query.limit` movies matching the query, highest rated first.
    async fn find_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>, StoreError>;
}
