//! Record delivery to the durable weather queue.
//!
//! Each publish call opens its own broker connection, declares the
//! durable queue, and sends one persistent message. Connection-level
//! failures retry with a doubling backoff up to a fixed attempt
//! ceiling; anything else (channel setup, protocol, serialization) is
//! fatal for the call and not retried.

use std::future::Future;
use std::time::Duration;

use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Connection};

use crate::api::WeatherObservation;
use crate::broker;
use crate::config::{PUBLISH_INITIAL_BACKOFF, PUBLISH_MAX_ATTEMPTS, WEATHER_QUEUE};

/// AMQP delivery mode marking a message persistent.
const PERSISTENT: u8 = 2;

// ── Errors ──────────────────────────────────────────────────────────

/// Errors from a publish call.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Transport-level failure reaching the broker; retried.
    #[error("broker connection failed: {0}")]
    Connection(String),

    /// Any other broker failure (channel setup, protocol); fatal.
    #[error("broker error: {0}")]
    Broker(String),

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to connect to broker after {0} attempts")]
    Exhausted(u32),
}

pub type Result<T> = std::result::Result<T, PublishError>;

/// Classify a connect failure: IO errors are transport-level and
/// retryable, everything else (bad credentials, protocol mismatch) is
/// fatal.
fn classify_connect(error: lapin::Error) -> PublishError {
    match &error {
        lapin::Error::IOError(_) => PublishError::Connection(error.to_string()),
        _ => PublishError::Broker(error.to_string()),
    }
}

// ── Retry policy ────────────────────────────────────────────────────

/// Bounded exponential backoff for broker connections.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: PUBLISH_MAX_ATTEMPTS,
            initial_backoff: PUBLISH_INITIAL_BACKOFF,
        }
    }
}

/// Run `operation` under the retry policy.
///
/// Only [`PublishError::Connection`] failures are retried; the delay
/// starts at the policy's initial backoff and doubles after every
/// failed attempt. Any other error aborts immediately.
pub async fn with_backoff<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut backoff = policy.initial_backoff;

    for attempt in 1..=policy.max_attempts {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(PublishError::Connection(e)) => {
                log::warn!(
                    "[Publisher] connection failed, retrying in {}s... (attempt {}/{}): {}",
                    backoff.as_secs(),
                    attempt,
                    policy.max_attempts,
                    e
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2;
            }
            Err(e) => {
                log::error!("[Publisher] unexpected error publishing to broker: {}", e);
                return Err(e);
            }
        }
    }

    log::error!(
        "[Publisher] failed to connect to broker after {} attempts",
        policy.max_attempts
    );
    Err(PublishError::Exhausted(policy.max_attempts))
}

// ── Publisher ───────────────────────────────────────────────────────

/// Publishes normalized observations to the durable weather queue.
#[derive(Debug, Clone)]
pub struct RecordPublisher {
    uri: String,
    policy: RetryPolicy,
}

impl RecordPublisher {
    /// Create a publisher connecting to the given AMQP URI.
    pub fn new(uri: String) -> Self {
        Self {
            uri,
            policy: RetryPolicy::default(),
        }
    }

    /// Serialize and deliver one observation.
    ///
    /// On success the message sits on the durable queue with
    /// persistent delivery. On exhausted retries the record is dropped;
    /// the caller does not retry further.
    pub async fn publish(&self, record: &WeatherObservation) -> Result<()> {
        let payload = serde_json::to_vec(record)?;
        with_backoff(&self.policy, || self.publish_once(&payload, &record.city)).await
    }

    /// One full connect → declare → publish → close attempt.
    async fn publish_once(&self, payload: &[u8], city: &str) -> Result<()> {
        let connection = broker::connect(&self.uri).await.map_err(classify_connect)?;

        // Past the connection handshake, failures are not retried.
        let result = deliver(&connection, payload).await;
        let _ = connection.close(0, "").await;
        result.map_err(|e| PublishError::Broker(e.to_string()))?;

        log::info!("[Publisher] sent data for {}", city);
        Ok(())
    }
}

async fn deliver(connection: &Connection, payload: &[u8]) -> std::result::Result<(), lapin::Error> {
    let channel = connection.create_channel().await?;
    channel
        .queue_declare(
            WEATHER_QUEUE,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;
    channel
        .basic_publish(
            "",
            WEATHER_QUEUE,
            BasicPublishOptions::default(),
            payload,
            BasicProperties::default().with_delivery_mode(PERSISTENT),
        )
        .await?
        .await?;
    Ok(())
}
