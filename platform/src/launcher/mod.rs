//! Isolated build runner launch contract
//!
//! The gateway hands one environment bag and one execution profile to the
//! external compute provisioner and learns only whether the launch was
//! accepted; the eventual build outcome is never reported back here.

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::PipelineError;
use crate::settings::LaunchSettings;

pub mod http;

/// Environment bag injected into one build instance
#[derive(Debug, Clone, Serialize)]
pub struct LaunchEnv {
    /// Repository URL to build
    pub source_location: String,

    /// Deployment slug, correlating logs, storage keys and routing
    pub deployment_id: String,
}

impl LaunchEnv {
    /// Environment variables as delivered to the instance
    pub fn to_env_vars(&self) -> Vec<(String, String)> {
        vec![
            ("SOURCE_LOCATION".to_string(), self.source_location.clone()),
            ("DEPLOYMENT_ID".to_string(), self.deployment_id.clone()),
        ]
    }
}

/// Execution profile for a launched build
#[derive(Debug, Clone, Serialize)]
pub struct LaunchProfile {
    pub network_mode: String,
    pub instance_count: u32,
    pub subnets: Vec<String>,
    pub security_groups: Vec<String>,
}

impl From<&LaunchSettings> for LaunchProfile {
    fn from(settings: &LaunchSettings) -> Self {
        Self {
            network_mode: settings.network_mode.clone(),
            instance_count: settings.instance_count,
            subnets: settings.subnets.clone(),
            security_groups: settings.security_groups.clone(),
        }
    }
}

/// Contract with the external compute provisioner.
///
/// `launch` is fire-and-forget: a single attempt, returning only launch
/// acceptance or rejection.
#[async_trait]
pub trait BuildRunner: Send + Sync {
    async fn launch(&self, profile: &LaunchProfile, env: &LaunchEnv) -> Result<(), PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_bag_variables() {
        let env = LaunchEnv {
            source_location: "https://github.com/acme/site.git".to_string(),
            deployment_id: "quiet-harbor-x4k2".to_string(),
        };

        let vars = env.to_env_vars();
        assert_eq!(vars.len(), 2);
        assert!(vars.contains(&("SOURCE_LOCATION".to_string(), "https://github.com/acme/site.git".to_string())));
        assert!(vars.contains(&("DEPLOYMENT_ID".to_string(), "quiet-harbor-x4k2".to_string())));
    }
}
