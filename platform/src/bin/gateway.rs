//! Skydock Gateway - Entry Point
//!
//! Admission-facing service: validates deployment requests, allocates
//! identity, launches isolated builds and bridges the log bus to live
//! viewers.

use skydock::app::options::{AppOptions, ServerOptions};
use skydock::app::run::run;
use skydock::logs::{init_logging, LogOptions};
use skydock::settings::GatewaySettings;
use skydock::utils::{await_shutdown_signal, version_info};
use skydock::workers::relay;

use tracing::{error, info};

#[tokio::main]
async fn main() {
    let settings = GatewaySettings::from_env();

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    let options = AppOptions {
        server: ServerOptions {
            host: settings.host.clone(),
            port: settings.port,
        },
        relay_worker: relay::Options {
            bus: settings.bus.clone(),
            ..Default::default()
        },
        launcher: settings.launcher.clone(),
        app_domain: settings.app_domain.clone(),
        rooms_capacity: settings.rooms_capacity,
        ..Default::default()
    };

    info!(
        "Running skydock gateway {} with options: {:?}",
        version_info().version,
        options
    );

    if let Err(e) = run(options, await_shutdown_signal()).await {
        error!("Gateway exited with error: {e}");
        std::process::exit(1);
    }
}
