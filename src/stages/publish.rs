use super::PUBLISH_SUMMARY;
use crate::{
    broker::MessageProducer,
    config::FailurePolicy,
    pipeline::{PipelineState, Stage, StageError, StateUpdate},
};
use async_trait::async_trait;
use std::sync::Arc;

/// Message sent when no stage produced a summary.
pub const SUMMARY_FALLBACK: &str = "No summary available";

/// Publishes the digest as a single message and waits for its delivery report.
pub struct PublishStage {
    producer: Arc<dyn MessageProducer>,
    topic: String,
    policy: FailurePolicy,
}

impl PublishStage {
    /// Create the stage for `topic`. Under [`FailurePolicy::Degrade`] failed deliveries are
    /// logged and the run continues.
    pub fn new(
        producer: Arc<dyn MessageProducer>,
        topic: impl Into<String>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            producer,
            topic: topic.into(),
            policy,
        }
    }
}

#[async_trait]
impl Stage for PublishStage {
    fn name(&self) -> &str {
        PUBLISH_SUMMARY
    }

    async fn run(&self, state: &PipelineState) -> Result<StateUpdate, StageError> {
        let summary = state.summary().unwrap_or(SUMMARY_FALLBACK);
        self.producer
            .enqueue(&self.topic, summary.as_bytes().to_vec())
            .await;
        let reports = self.producer.flush().await;

        let mut failures = Vec::new();
        for report in &reports {
            match &report.outcome {
                Ok(receipt) => tracing::info!(
                    topic = %report.topic,
                    partition = receipt.partition,
                    offset = receipt.offset,
                    "Digest delivered"
                ),
                Err(error) => {
                    tracing::error!(topic = %report.topic, %error, "Digest delivery failed");
                    failures.push(error.to_string());
                }
            }
        }

        if !failures.is_empty() && self.policy == FailurePolicy::Abort {
            return Err(StageError::Delivery {
                failed: failures.len(),
                total: reports.len(),
                reason: failures.swap_remove(0),
            });
        }
        Ok(StateUpdate::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broker::{DeliveryError, DeliveryReceipt, DeliveryReport};
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct StubProducer {
        fail: bool,
        queued: Mutex<Vec<(String, Vec<u8>)>>,
        sent: Mutex<Vec<(String, Vec<u8>)>>,
        flushes: Mutex<usize>,
    }

    #[async_trait]
    impl MessageProducer for StubProducer {
        async fn enqueue(&self, topic: &str, value: Vec<u8>) {
            self.queued.lock().await.push((topic.to_string(), value));
        }

        async fn flush(&self) -> Vec<DeliveryReport> {
            *self.flushes.lock().await += 1;
            let queued = std::mem::take(&mut *self.queued.lock().await);
            let mut reports = Vec::new();
            for (topic, value) in queued {
                let outcome = if self.fail {
                    Err(DeliveryError::Transport("connection refused".into()))
                } else {
                    Ok(DeliveryReceipt {
                        partition: 0,
                        offset: 7,
                    })
                };
                self.sent.lock().await.push((topic.clone(), value));
                reports.push(DeliveryReport { topic, outcome });
            }
            reports
        }
    }

    #[tokio::test]
    async fn publishes_summary_once_and_flushes() {
        let producer = Arc::new(StubProducer::default());
        let stage = PublishStage::new(producer.clone(), "digests", FailurePolicy::Degrade);

        let update = stage
            .run(&PipelineState::new(Vec::new(), "X"))
            .await
            .expect("update");

        assert!(update.is_empty());
        assert_eq!(
            *producer.sent.lock().await,
            vec![("digests".to_string(), b"X".to_vec())]
        );
        assert_eq!(*producer.flushes.lock().await, 1);
        assert!(producer.queued.lock().await.is_empty());
    }

    #[tokio::test]
    async fn missing_summary_publishes_fallback() {
        let producer = Arc::new(StubProducer::default());
        let stage = PublishStage::new(producer.clone(), "digests", FailurePolicy::Degrade);

        stage
            .run(&PipelineState::default())
            .await
            .expect("update");

        assert_eq!(
            producer.sent.lock().await[0].1,
            SUMMARY_FALLBACK.as_bytes().to_vec()
        );
    }

    #[tokio::test]
    async fn failed_delivery_is_logged_under_degrade() {
        let producer = Arc::new(StubProducer {
            fail: true,
            ..StubProducer::default()
        });
        let stage = PublishStage::new(producer.clone(), "digests", FailurePolicy::Degrade);

        let update = stage
            .run(&PipelineState::new(Vec::new(), "X"))
            .await
            .expect("degrade keeps running");

        assert!(update.is_empty());
        assert_eq!(*producer.flushes.lock().await, 1);
    }

    #[tokio::test]
    async fn failed_delivery_raises_under_abort() {
        let producer = Arc::new(StubProducer {
            fail: true,
            ..StubProducer::default()
        });
        let stage = PublishStage::new(producer.clone(), "digests", FailurePolicy::Abort);

        let error = stage
            .run(&PipelineState::new(Vec::new(), "X"))
            .await
            .expect_err("abort");

        assert!(matches!(
            error,
            StageError::Delivery { failed: 1, total: 1, ref reason } if reason.contains("connection refused")
        ));
        assert_eq!(*producer.flushes.lock().await, 1);
    }
}
