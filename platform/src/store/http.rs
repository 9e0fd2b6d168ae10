//! HTTP object store client

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, error};

use crate::errors::PipelineError;
use crate::settings::StoreSettings;
use crate::store::ObjectStore;

/// Object store client speaking plain HTTP PUT against the store origin
pub struct HttpStore {
    client: Client,
    origin: String,
    bucket: String,
}

impl HttpStore {
    pub fn new(settings: &StoreSettings) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            origin: settings.origin.trim_end_matches('/').to_string(),
            bucket: settings.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for HttpStore {
    async fn put(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<(), PipelineError> {
        let url = format!("{}/{}/{}", self.origin, self.bucket, key);
        debug!("PUT {} ({})", url, content_type);

        let response = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(content)
            .send()
            .await
            .map_err(|e| PipelineError::StorageError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Store PUT failed: {} - {}", status, body);
            return Err(PipelineError::StorageError(format!("{}: {}", status, body)));
        }

        Ok(())
    }
}
