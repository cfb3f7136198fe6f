//! Trigger listener: runs a collection immediately on demand.
//!
//! Holds a persistent subscription on the durable trigger queue. Each
//! delivery runs the collection job to completion before the message
//! is acknowledged, so a crash mid-job leaves the trigger queued for
//! redelivery. Listener-level errors reconnect after a fixed delay for
//! the life of the process.

use std::future::Future;

use futures::StreamExt;
use lapin::options::{BasicAckOptions, BasicConsumeOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use tokio::sync::watch;

use crate::broker;
use crate::config::{LISTENER_RETRY_DELAY, TRIGGER_QUEUE};

/// Consume the trigger queue until shutdown, invoking `job` once per
/// received message.
pub async fn run_listener<F, Fut>(uri: String, mut shutdown: watch::Receiver<()>, job: F)
where
    F: Fn() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        tokio::select! {
            result = listen_once(&uri, &job) => {
                if let Err(e) = result {
                    log::error!("[Listener] error in trigger listener: {}", e);
                }
                tokio::select! {
                    _ = tokio::time::sleep(LISTENER_RETRY_DELAY) => {}
                    _ = shutdown.changed() => {
                        log::info!("[Listener] shutdown signal received, exiting");
                        break;
                    }
                }
            }
            _ = shutdown.changed() => {
                log::info!("[Listener] shutdown signal received, exiting");
                break;
            }
        }
    }
}

/// One subscription lifetime: connect, declare, consume until the
/// stream ends or errors.
async fn listen_once<F, Fut>(uri: &str, job: &F) -> Result<(), lapin::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = ()>,
{
    let connection = broker::connect(uri).await?;
    let channel = connection.create_channel().await?;
    channel
        .queue_declare(
            TRIGGER_QUEUE,
            QueueDeclareOptions {
                durable: true,
                ..Default::default()
            },
            FieldTable::default(),
        )
        .await?;

    let mut consumer = channel
        .basic_consume(
            TRIGGER_QUEUE,
            "collector",
            BasicConsumeOptions::default(),
            FieldTable::default(),
        )
        .await?;

    log::info!("[Listener] listening for collection triggers...");

    while let Some(delivery) = consumer.next().await {
        let delivery = delivery?;
        log::info!("[Listener] received trigger, collecting immediately...");
        // Ack only after the job completes; a crash mid-job leaves the
        // trigger unacknowledged for redelivery.
        job().await;
        delivery.ack(BasicAckOptions::default()).await?;
    }

    Ok(())
}
