//! Skydock Router - Entry Point
//!
//! Stateless reverse proxy serving completed deployments: resolves the
//! request's subdomain to a storage key prefix and forwards to the
//! artifact store.

use std::sync::Arc;

use skydock::logs::{init_logging, LogOptions};
use skydock::routing::proxy::{build_router, RouterState};
use skydock::settings::RouterSettings;
use skydock::utils::{await_shutdown_signal, version_info};

use tokio::net::TcpListener;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let settings = RouterSettings::from_env();

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    let state = match RouterState::new(&settings.store) {
        Ok(state) => Arc::new(state),
        Err(e) => {
            error!("Failed to create router state: {e}");
            std::process::exit(1);
        }
    };

    let app = build_router(state);
    let addr = format!("{}:{}", settings.host, settings.port);

    info!(
        "Skydock router {} listening on {}, serving from {}",
        version_info().version,
        addr,
        settings.store.origin
    );

    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(await_shutdown_signal())
        .await
    {
        error!("Router exited with error: {e}");
        std::process::exit(1);
    }
}
