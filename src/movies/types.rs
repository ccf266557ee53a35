//! Shared types used by the movie store client and stages.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Placeholder used when a movie has neither a full nor a short plot.
pub const MISSING_DESCRIPTION: &str = "No description.";
const UNTITLED: &str = "(untitled)";

/// Errors returned while querying the movie store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid store URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The store responded with an unexpected status code.
    #[error("Unexpected store response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the store.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// A movie projected down to the fields the digest needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    /// Display title.
    pub title: String,
    /// Short plot synopsis.
    pub plot: Option<String>,
    /// Long-form plot description.
    pub fullplot: Option<String>,
    /// Genre labels.
    pub genres: Vec<String>,
    /// IMDb rating.
    pub rating: Option<f64>,
    /// Release year.
    pub year: Option<i32>,
}

impl Movie {
    /// Best available description: the full plot, then the short plot, then a placeholder.
    pub fn description(&self) -> &str {
        [self.fullplot.as_deref(), self.plot.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|text| !text.is_empty())
            .unwrap_or(MISSING_DESCRIPTION)
    }
}

#[derive(Deserialize)]
pub(crate) struct FindResponse {
    #[serde(default)]
    pub(crate) documents: Vec<Value>,
}

/// Raw projected document as returned by the Data API.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MovieDocument {
    #[serde(default)]
    pub(crate) title: Option<Value>,
    #[serde(default)]
    pub(crate) plot: Option<String>,
    #[serde(default)]
    pub(crate) fullplot: Option<String>,
    #[serde(default)]
    pub(crate) genres: Option<Vec<String>>,
    #[serde(default)]
    pub(crate) imdb: Option<ImdbDocument>,
    #[serde(default)]
    pub(crate) year: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ImdbDocument {
    #[serde(default)]
    pub(crate) rating: Option<Value>,
}

impl From<MovieDocument> for Movie {
    fn from(document: MovieDocument) -> Self {
        let MovieDocument {
            title,
            plot,
            fullplot,
            genres,
            imdb,
            year,
        } = document;

        Self {
            title: title
                .as_ref()
                .and_then(lenient_text)
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string()),
            plot,
            fullplot,
            genres: genres.unwrap_or_default(),
            rating: imdb
                .and_then(|imdb| imdb.rating)
                .as_ref()
                .and_then(lenient_number),
            year: year.as_ref().and_then(lenient_year),
        }
    }
}

/// Decode raw documents one by one; a document that cannot be read is logged and skipped.
pub(crate) fn decode_documents(documents: Vec<Value>) -> Vec<Movie> {
    documents
        .into_iter()
        .enumerate()
        .filter_map(
            |(index, document)| match serde_json::from_value::<MovieDocument>(document) {
                Ok(document) => Some(Movie::from(document)),
                Err(error) => {
                    tracing::warn!(index, %error, "Skipping undecodable movie document");
                    None
                }
            },
        )
        .collect()
}

/// Titles are text, but numeric titles (`1776`, `2001`) sometimes arrive as numbers.
fn lenient_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.trim().to_string()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

/// Read a number that may arrive as plain JSON, a numeric string, or an extended-JSON wrapper
/// such as `{"$numberDouble": "8.6"}`.
fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Object(map) => ["$numberDouble", "$numberInt", "$numberLong", "$numberDecimal"]
            .iter()
            .find_map(|key| map.get(*key))
            .and_then(lenient_number),
        _ => None,
    }
}

/// Years are mostly integers, but some documents carry strings like `"2007è"`; keep the
/// leading digits.
fn lenient_year(value: &Value) -> Option<i32> {
    match value {
        Value::String(text) => {
            let digits: String = text
                .trim()
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse().ok()
        }
        other => lenient_number(other).map(|year| year as i32),
    }
}
