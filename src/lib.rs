//! Weather collector service.
//!
//! Periodically fetches current conditions from Open-Meteo for a
//! configured location, normalizes them into a fixed record shape, and
//! publishes each record to a durable RabbitMQ queue. A second durable
//! queue carries trigger messages that force an immediate out-of-band
//! collection, concurrent with the timer-driven path.

pub mod api;
pub mod broker;
pub mod conditions;
pub mod config;
pub mod listener;
pub mod node;
pub mod publisher;
pub mod resolver;

pub use api::{ApiError, WeatherFetcher, WeatherObservation};
pub use conditions::condition_for_code;
pub use config::{Config, LocationConfig, TRIGGER_QUEUE, WEATHER_QUEUE};
pub use node::CollectorNode;
pub use publisher::{PublishError, RecordPublisher, RetryPolicy};
pub use resolver::ConfigResolver;
