//! Shared types for the message broker integration.

use super::properties::PropertiesError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while configuring a producer.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// The properties file could not be loaded.
    #[error(transparent)]
    Properties(#[from] PropertiesError),
    /// A required property was missing or empty.
    #[error("Missing broker property: {0}")]
    MissingProperty(&'static str),
    /// The REST endpoint failed to parse.
    #[error("Invalid broker URL: {0}")]
    InvalidUrl(String),
    /// The HTTP client could not be constructed.
    #[error("HTTP client setup failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Why a single message was not acknowledged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),
    /// The broker answered with a non-success status.
    #[error("broker rejected record ({status}): {body}")]
    Rejected {
        /// HTTP status returned.
        status: StatusCode,
        /// Response body.
        body: String,
    },
    /// The broker accepted the request but reported an error code for the record.
    #[error("broker error {code}: {message}")]
    Broker {
        /// Broker error code.
        code: u32,
        /// Broker error message.
        message: String,
    },
    /// The payload cannot be sent as a string record.
    #[error("payload is not valid UTF-8")]
    InvalidPayload,
}

/// Where an acknowledged message landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Partition the record was written to.
    pub partition: i32,
    /// Offset assigned to the record.
    pub offset: i64,
}

/// Outcome of one enqueued message, available once `flush` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Destination topic.
    pub topic: String,
    /// Receipt on success, reason on failure.
    pub outcome: Result<DeliveryReceipt, DeliveryError>,
}

impl DeliveryReport {
    /// Whether the broker acknowledged the message.
    pub fn is_delivered(&self) -> bool {
        self.outcome.is_ok()
    }
}
