//! Broker connection setup shared by the publisher and the listener.

use lapin::{Connection, ConnectionProperties};

/// Open a fresh connection to the broker.
///
/// Every caller opens and closes its own connection; nothing is pooled
/// or reused across collection runs.
pub async fn connect(uri: &str) -> Result<Connection, lapin::Error> {
    let options = ConnectionProperties::default()
        .with_executor(tokio_executor_trait::Tokio::current())
        .with_reactor(tokio_reactor_trait::Tokio);
    Connection::connect(uri, options).await
}
