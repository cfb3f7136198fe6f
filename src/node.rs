//! Collector node: job orchestration and the scheduled loop.
//!
//! Two concurrent paths invoke the same stateless collection job: a
//! fixed-interval scheduler and the trigger listener. Neither path
//! excludes the other; every run re-resolves its location and opens a
//! fresh broker connection, so concurrent runs only risk near-duplicate
//! publishes.

use std::sync::Arc;

use tokio::sync::watch;

use crate::api::WeatherFetcher;
use crate::config::{Config, SCHEDULE_PERIOD};
use crate::listener::run_listener;
use crate::publisher::RecordPublisher;
use crate::resolver::ConfigResolver;

/// The collector service: scheduler, trigger listener, and the shared
/// collection job.
#[derive(Debug)]
pub struct CollectorNode {
    config: Config,
    resolver: ConfigResolver,
    fetcher: WeatherFetcher,
    publisher: RecordPublisher,
}

impl CollectorNode {
    /// Build the node and its HTTP clients from the given config.
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let resolver = ConfigResolver::new(&config.backend_url)?;
        let fetcher = WeatherFetcher::new(&config.provider_url)?;
        let publisher = RecordPublisher::new(config.amqp_uri());
        Ok(Self {
            config,
            resolver,
            fetcher,
            publisher,
        })
    }

    /// One collection run: resolve location, fetch, publish.
    ///
    /// Stateless and safe to invoke concurrently from both paths. A
    /// fetch failure skips the publish; the next run is the retry.
    pub async fn run_once(&self) {
        log::info!("[Collector] starting data collection job...");

        let location = self.resolver.resolve(&self.config.default_location).await;
        match self.fetcher.fetch(&location).await {
            Ok(observation) => {
                if let Err(e) = self.publisher.publish(&observation).await {
                    log::error!("[Collector] dropping observation: {}", e);
                }
            }
            Err(e) => {
                log::error!("[Collector] error fetching weather data: {}", e);
                log::warn!("[Collector] no weather data collected");
            }
        }
    }

    /// Run the service until the shutdown signal fires.
    ///
    /// Spawns the trigger listener as its own task, runs the job once
    /// at startup, then on every schedule tick.
    pub async fn run(self, shutdown_tx: watch::Sender<()>) {
        let node = Arc::new(self);

        let listener = {
            let node = node.clone();
            let uri = node.config.amqp_uri();
            let shutdown = shutdown_tx.subscribe();
            tokio::spawn(async move {
                run_listener(uri, shutdown, move || {
                    let node = node.clone();
                    async move { node.run_once().await }
                })
                .await;
            })
        };

        // Run once on startup.
        node.run_once().await;

        log::info!(
            "[Collector] service started, running every {}s",
            SCHEDULE_PERIOD.as_secs()
        );

        let mut shutdown = shutdown_tx.subscribe();
        let mut interval = tokio::time::interval(SCHEDULE_PERIOD);
        // First tick fires immediately; consume it, the startup run
        // already happened.
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    node.run_once().await;
                }
                _ = shutdown.changed() => {
                    log::info!("[Collector] shutdown signal received, exiting");
                    break;
                }
            }
        }

        if let Err(e) = listener.await {
            log::warn!("[Collector] listener task did not exit cleanly: {}", e);
        }
    }
}
