use argh::FromArgs;
use weather_collector::{CollectorNode, Config};

#[derive(FromArgs)]
/// Weather collector: publishes Open-Meteo observations to RabbitMQ.
///
/// Configuration comes from the environment (RABBITMQ_URI or
/// RABBITMQ_USER/PASSWORD/HOST/PORT, CITY_NAME, LATITUDE, LONGITUDE,
/// BACKEND_URL). Runs until terminated.
struct Args {}

#[tokio::main]
async fn main() {
    // Initialize logging
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let _args: Args = argh::from_env();

    let config = Config::from_env();

    // Create shutdown channel
    let shutdown_tx = tokio::sync::watch::Sender::new(());

    // Set up Ctrl+C handler
    {
        let shutdown_tx = shutdown_tx.clone();
        ctrlc::set_handler(move || {
            log::info!("Received Ctrl+C, shutting down gracefully...");
            let _ = shutdown_tx.send(());
        })
        .expect("Error setting Ctrl+C handler");
    }

    let node = match CollectorNode::new(config) {
        Ok(node) => node,
        Err(e) => {
            log::error!("Failed to initialize collector: {}", e);
            std::process::exit(1);
        }
    };

    node.run(shutdown_tx).await;

    log::info!("Collector shut down, exiting");
}
