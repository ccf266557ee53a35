//! Kafka REST (v3) producer.
//!
//! Messages are buffered by [`MessageProducer::enqueue`] and sent one request per record on
//! [`MessageProducer::flush`], which returns only after every record has a delivery report.

use super::{
    MessageProducer,
    properties::Properties,
    types::{BrokerError, DeliveryError, DeliveryReceipt, DeliveryReport},
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::sync::Mutex;

const REST_ENDPOINT_KEY: &str = "rest.endpoint";
const CLUSTER_ID_KEY: &str = "cluster.id";
const USERNAME_KEY: &str = "sasl.username";
const PASSWORD_KEY: &str = "sasl.password";
const RECORD_OK: u32 = 200;

struct PendingRecord {
    topic: String,
    value: Vec<u8>,
}

/// Producer that writes records through the Kafka REST produce API.
pub struct RestProducer {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) cluster_id: String,
    pub(crate) credentials: Option<(String, String)>,
    pending: Mutex<Vec<PendingRecord>>,
}

#[derive(Debug, Deserialize)]
struct ProduceResponse {
    error_code: u32,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    partition_id: i32,
    #[serde(default)]
    offset: i64,
}

impl RestProducer {
    /// Build a producer from `rest.endpoint`, `cluster.id`, and optional
    /// `sasl.username`/`sasl.password` (sent as basic auth).
    pub fn from_properties(properties: &Properties, timeout: Duration) -> Result<Self, BrokerError> {
        let endpoint = properties
            .get(REST_ENDPOINT_KEY)
            .ok_or(BrokerError::MissingProperty(REST_ENDPOINT_KEY))?;
        let cluster_id = properties
            .get(CLUSTER_ID_KEY)
            .ok_or(BrokerError::MissingProperty(CLUSTER_ID_KEY))?;
        let base_url = reqwest::Url::parse(endpoint)
            .map_err(|error| BrokerError::InvalidUrl(format!("{endpoint}: {error}")))?
            .to_string();
        let credentials = match (properties.get(USERNAME_KEY), properties.get(PASSWORD_KEY)) {
            (Some(user), Some(password)) => Some((user.to_string(), password.to_string())),
            (Some(_), None) => return Err(BrokerError::MissingProperty(PASSWORD_KEY)),
            _ => None,
        };
        let client = Client::builder()
            .user_agent("movie-digest/producer")
            .timeout(timeout)
            .build()?;

        tracing::debug!(
            endpoint = %base_url,
            cluster_id,
            authenticated = credentials.is_some(),
            "Initialized REST producer"
        );

        Ok(Self::new(client, base_url, cluster_id.to_string(), credentials))
    }

    pub(crate) fn new(
        client: Client,
        base_url: String,
        cluster_id: String,
        credentials: Option<(String, String)>,
    ) -> Self {
        Self {
            client,
            base_url,
            cluster_id,
            credentials,
            pending: Mutex::new(Vec::new()),
        }
    }

    fn records_url(&self, topic: &str) -> String {
        format!(
            "{}/kafka/v3/clusters/{}/topics/{}/records",
            self.base_url.trim_end_matches('/'),
            self.cluster_id,
            topic
        )
    }

    async fn deliver(&self, record: PendingRecord) -> DeliveryReport {
        let PendingRecord { topic, value } = record;
        let outcome = self.send_record(&topic, value).await;
        DeliveryReport { topic, outcome }
    }

    async fn send_record(
        &self,
        topic: &str,
        value: Vec<u8>,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        let text = String::from_utf8(value).map_err(|_| DeliveryError::InvalidPayload)?;
        let body = json!({
            "value": { "type": "STRING", "data": text }
        });

        let mut request = self.client.post(self.records_url(topic)).json(&body);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, Some(password));
        }

        let response = request
            .send()
            .await
            .map_err(|error| DeliveryError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected { status, body });
        }

        let ack: ProduceResponse = response
            .json()
            .await
            .map_err(|error| DeliveryError::Transport(format!("undecodable ack: {error}")))?;

        if ack.error_code != RECORD_OK {
            return Err(DeliveryError::Broker {
                code: ack.error_code,
                message: ack.message.unwrap_or_default(),
            });
        }

        Ok(DeliveryReceipt {
            partition: ack.partition_id,
            offset: ack.offset,
        })
    }
}

#[async_trait]
impl MessageProducer for RestProducer {
    async fn enqueue(&self, topic: &str, value: Vec<u8>) {
        self.pending.lock().await.push(PendingRecord {
            topic: topic.to_string(),
            value,
        });
    }

    async fn flush(&self) -> Vec<DeliveryReport> {
        let records = std::mem::take(&mut *self.pending.lock().await);
        let mut reports = Vec::with_capacity(records.len());
        for record in records {
            reports.push(self.deliver(record).await);
        }
        reports
    }
}
