//! HTTP client wrapper for the MongoDB Data API.

use crate::config::Config;
use crate::movies::{
    MovieStore,
    query::MovieQuery,
    types::{FindResponse, Movie, StoreError, decode_documents},
};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

/// Movie store backed by the MongoDB Data API `find` action.
pub struct MongoDataApiStore {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) data_source: String,
    pub(crate) database: String,
    pub(crate) collection: String,
}

impl MongoDataApiStore {
    /// Construct a store client from the run configuration.
    pub fn new(config: &Config) -> Result<Self, StoreError> {
        let client = Client::builder()
            .user_agent("movie-digest/0.1")
            .timeout(config.http_timeout())
            .build()?;

        let base_url = normalize_base_url(&config.mongodb_uri).map_err(StoreError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            database = %config.mongodb_database,
            collection = %config.mongodb_collection,
            has_api_key = config.mongodb_api_key.is_some(),
            "Initialized movie store client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.mongodb_api_key.clone(),
            data_source: config.mongodb_data_source.clone(),
            database: config.mongodb_database.clone(),
            collection: config.mongodb_collection.clone(),
        })
    }

    fn request(&self, action: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, &format!("action/{action}"));
        let mut req = self.client.post(url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("api-key", api_key);
        }
        req
    }
}

#[async_trait]
impl MovieStore for MongoDataApiStore {
    async fn find_movies(&self, query: &MovieQuery) -> Result<Vec<Movie>, StoreError> {
        let body = json!({
            "dataSource": self.data_source,
            "database": self.database,
            "collection": self.collection,
            "filter": query.filter(),
            "projection": query.projection(),
            "sort": query.sort(),
            "limit": query.limit,
        });

        let response = self.request("find").json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = StoreError::UnexpectedStatus { status, body };
            tracing::error!(collection = %self.collection, error = %error, "Movie query failed");
            return Err(error);
        }

        let FindResponse { documents } = response.json().await?;
        let received = documents.len();
        let mut movies = decode_documents(documents);
        movies.truncate(query.limit);
        tracing::debug!(
            collection = %self.collection,
            received,
            movies = movies.len(),
            "Movie query returned"
        );
        Ok(movies)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!(
            "unsupported scheme '{}'; MONGODB_URI must be the Data API HTTP(S) endpoint",
            parsed.scheme()
        ));
    }
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
