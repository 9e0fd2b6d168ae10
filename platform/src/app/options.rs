//! Gateway application options

use std::time::Duration;

use crate::settings::LaunchSettings;
use crate::workers::relay;

/// Main gateway options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// HTTP server configuration
    pub server: ServerOptions,

    /// Relay worker options
    pub relay_worker: relay::Options,

    /// Launch contract configuration
    pub launcher: LaunchSettings,

    /// Domain under which deployments are served
    pub app_domain: String,

    /// Per-room broadcast buffer capacity
    pub rooms_capacity: usize,

    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            server: ServerOptions::default(),
            relay_worker: relay::Options::default(),
            launcher: LaunchSettings::default(),
            app_domain: "localhost:8000".to_string(),
            rooms_capacity: 256,
            max_shutdown_delay: Duration::from_secs(30),
        }
    }
}

/// Gateway HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9000,
        }
    }
}
