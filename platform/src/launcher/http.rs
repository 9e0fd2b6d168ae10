//! HTTP launch client for the build runner

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use crate::errors::PipelineError;
use crate::launcher::{BuildRunner, LaunchEnv, LaunchProfile};

/// Launch client posting run requests to the provisioner's HTTP API
pub struct HttpRunner {
    client: Client,
    origin: String,
}

impl HttpRunner {
    pub fn new(origin: &str) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl BuildRunner for HttpRunner {
    async fn launch(&self, profile: &LaunchProfile, env: &LaunchEnv) -> Result<(), PipelineError> {
        let url = format!("{}/tasks", self.origin);
        debug!("POST {} (launch)", url);

        let environment: HashMap<String, String> = env.to_env_vars().into_iter().collect();
        let body = serde_json::json!({
            "profile": profile,
            "environment": environment,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PipelineError::LaunchRejected(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Launch request rejected: {} - {}", status, body);
            return Err(PipelineError::LaunchRejected(format!("{}: {}", status, body)));
        }

        Ok(())
    }
}
