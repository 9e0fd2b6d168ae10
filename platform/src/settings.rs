//! Environment-derived configuration
//!
//! Each process reads its settings exactly once at start-up; components
//! receive them by parameter and never consult ambient state afterwards.

use std::path::PathBuf;
use std::str::FromStr;

use crate::bus::client::BusAddress;
use crate::logs::LogLevel;

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(name: &str, default: T) -> T {
    env_var(name).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_list(name: &str) -> Vec<String> {
    env_var(name)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn log_level_from_env() -> LogLevel {
    env_parse("SKYDOCK_LOG_LEVEL", LogLevel::Info)
}

/// Log bus settings shared by gateway and builder
pub fn bus_from_env() -> BusAddress {
    BusAddress {
        host: env_var("SKYDOCK_BUS_HOST").unwrap_or_else(|| "localhost".to_string()),
        port: env_parse("SKYDOCK_BUS_PORT", 1883),
        use_tls: env_parse("SKYDOCK_BUS_TLS", false),
        ca_cert_path: env_var("SKYDOCK_BUS_CA_CERT"),
    }
}

/// Object store connection settings
#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// HTTP origin of the artifact store
    pub origin: String,

    /// Bucket holding deployment outputs
    pub bucket: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            origin: "http://localhost:9444".to_string(),
            bucket: "skydock-outputs".to_string(),
        }
    }
}

impl StoreSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            origin: env_var("SKYDOCK_STORE_ORIGIN").unwrap_or(defaults.origin),
            bucket: env_var("SKYDOCK_STORE_BUCKET").unwrap_or(defaults.bucket),
        }
    }
}

/// Launch contract settings for the isolated build runner.
///
/// The compute and network identifiers are deployment-environment
/// configuration, never hard-coded.
#[derive(Debug, Clone)]
pub struct LaunchSettings {
    /// HTTP origin of the compute provisioner
    pub origin: String,

    /// Network mode for the launched instance
    pub network_mode: String,

    /// Instances launched per deployment
    pub instance_count: u32,

    /// Subnet identifiers for the launched instance
    pub subnets: Vec<String>,

    /// Security group identifiers for the launched instance
    pub security_groups: Vec<String>,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            origin: "http://localhost:9500".to_string(),
            network_mode: "public".to_string(),
            instance_count: 1,
            subnets: Vec::new(),
            security_groups: Vec::new(),
        }
    }
}

impl LaunchSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            origin: env_var("SKYDOCK_RUNNER_ORIGIN").unwrap_or(defaults.origin),
            network_mode: env_var("SKYDOCK_RUNNER_NETWORK_MODE").unwrap_or(defaults.network_mode),
            instance_count: env_parse("SKYDOCK_RUNNER_INSTANCE_COUNT", defaults.instance_count),
            subnets: env_list("SKYDOCK_RUNNER_SUBNETS"),
            security_groups: env_list("SKYDOCK_RUNNER_SECURITY_GROUPS"),
        }
    }
}

/// Gateway process settings
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    pub log_level: LogLevel,

    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Domain under which deployments are served, e.g. `localhost:8000`
    pub app_domain: String,

    /// Per-room broadcast buffer capacity
    pub rooms_capacity: usize,

    pub bus: BusAddress,
    pub launcher: LaunchSettings,
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            host: "0.0.0.0".to_string(),
            port: 9000,
            app_domain: "localhost:8000".to_string(),
            rooms_capacity: 256,
            bus: BusAddress::default(),
            launcher: LaunchSettings::default(),
        }
    }
}

impl GatewaySettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: log_level_from_env(),
            host: env_var("SKYDOCK_GATEWAY_HOST").unwrap_or(defaults.host),
            port: env_parse("SKYDOCK_GATEWAY_PORT", defaults.port),
            app_domain: env_var("SKYDOCK_APP_DOMAIN").unwrap_or(defaults.app_domain),
            rooms_capacity: env_parse("SKYDOCK_ROOMS_CAPACITY", defaults.rooms_capacity),
            bus: bus_from_env(),
            launcher: LaunchSettings::from_env(),
        }
    }
}

/// Artifact router process settings
#[derive(Debug, Clone)]
pub struct RouterSettings {
    pub log_level: LogLevel,

    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    pub store: StoreSettings,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            host: "0.0.0.0".to_string(),
            port: 8000,
            store: StoreSettings::default(),
        }
    }
}

impl RouterSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: log_level_from_env(),
            host: env_var("SKYDOCK_ROUTER_HOST").unwrap_or(defaults.host),
            port: env_parse("SKYDOCK_ROUTER_PORT", defaults.port),
            store: StoreSettings::from_env(),
        }
    }
}

/// Builder process settings.
///
/// `DEPLOYMENT_ID` and `SOURCE_LOCATION` form the environment bag injected
/// by the launch contract; the rest configures the build itself.
#[derive(Debug, Clone)]
pub struct BuilderSettings {
    pub log_level: LogLevel,

    /// Deployment identity; absence is fatal to the orchestrator
    pub deployment_id: Option<String>,

    /// Source repository URL, cloned by the environment's entrypoint
    pub source_location: Option<String>,

    /// Local path where the entrypoint placed the source tree
    pub source_dir: PathBuf,

    /// Build output directory name, relative to the source tree
    pub output_dir: String,

    /// Install-and-build shell command
    pub build_command: String,

    pub bus: BusAddress,
    pub store: StoreSettings,
}

impl Default for BuilderSettings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            deployment_id: None,
            source_location: None,
            source_dir: PathBuf::from("/home/app/output"),
            output_dir: "dist".to_string(),
            build_command: "npm install && npm run build".to_string(),
            bus: BusAddress::default(),
            store: StoreSettings::default(),
        }
    }
}

impl BuilderSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            log_level: log_level_from_env(),
            deployment_id: env_var("DEPLOYMENT_ID"),
            source_location: env_var("SOURCE_LOCATION"),
            source_dir: env_var("SKYDOCK_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.source_dir),
            output_dir: env_var("SKYDOCK_OUTPUT_DIR").unwrap_or(defaults.output_dir),
            build_command: env_var("SKYDOCK_BUILD_COMMAND").unwrap_or(defaults.build_command),
            bus: bus_from_env(),
            store: StoreSettings::from_env(),
        }
    }
}
