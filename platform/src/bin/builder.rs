//! Skydock Builder - Entry Point
//!
//! Runs once inside the isolated build environment: builds one deployment's
//! source tree, streams progress to the log bus and uploads the resulting
//! artifacts. Any fatal error terminates the process with a non-zero exit.

use std::sync::Arc;

use skydock::build::orchestrator::Orchestrator;
use skydock::build::sink::BusLogSink;
use skydock::bus::client::BusPublisher;
use skydock::logs::{init_logging, LogOptions};
use skydock::settings::BuilderSettings;
use skydock::store::http::HttpStore;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    let settings = BuilderSettings::from_env();

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    // The sink needs a channel key even when the identity is absent; the
    // orchestrator still fails with MissingIdentity in that case.
    let slug = settings
        .deployment_id
        .clone()
        .unwrap_or_else(|| "unknown".to_string());

    let bus = match BusPublisher::connect(&settings.bus, &format!("skydock-builder-{}", slug)) {
        Ok(bus) => Arc::new(bus),
        Err(e) => {
            error!("Failed to connect to log bus: {e}");
            std::process::exit(1);
        }
    };

    let store = match HttpStore::new(&settings.store) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to create store client: {e}");
            std::process::exit(1);
        }
    };

    let sink = Arc::new(BusLogSink::new(bus.clone(), slug));
    let orchestrator = Orchestrator::new(settings, store, sink);

    let result = orchestrator.run().await;

    // Let queued log lines drain before the process exits
    bus.close().await;

    match result {
        Ok(()) => {
            info!("Build orchestration complete");
        }
        Err(e) => {
            error!("Build orchestration failed: {e}");
            std::process::exit(1);
        }
    }
}
