//! Message broker integration used by the publish stage.

use async_trait::async_trait;

pub mod producer;
pub mod properties;
pub mod types;

pub use producer::RestProducer;
pub use properties::{Properties, PropertiesError};
pub use types::{BrokerError, DeliveryError, DeliveryReceipt, DeliveryReport};

/// Buffered message producer.
#[async_trait]
pub trait MessageProducer: Send + Sync {
    /// Queue `value` for delivery to `topic`. Nothing is sent until [`flush`](Self::flush).
    async fn enqueue(&self, topic: &str, value: Vec<u8>);

    /// Send every queued message and wait for all delivery reports.
    async fn flush(&self) -> Vec<DeliveryReport>;
}
