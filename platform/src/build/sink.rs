//! Build log emission

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::bus::channels::Channels;
use crate::bus::client::BusPublisher;
use crate::models::deployment::{BuildStatus, LogMessage, StatusMessage};

/// Sink for build progress; the log bus in production, a recorder in tests.
///
/// Emission is best-effort: a sink failure is logged and never aborts the
/// build itself.
#[async_trait]
pub trait LogSink: Send + Sync {
    /// Emit one free-text log line
    async fn emit(&self, message: &str);

    /// Emit a status change on the deployment's status channel
    async fn emit_status(&self, status: BuildStatus, exit_code: Option<i32>);
}

/// Log sink publishing to the per-deployment bus channels
pub struct BusLogSink {
    bus: Arc<BusPublisher>,
    slug: String,
}

impl BusLogSink {
    pub fn new(bus: Arc<BusPublisher>, slug: impl Into<String>) -> Self {
        Self {
            bus,
            slug: slug.into(),
        }
    }
}

#[async_trait]
impl LogSink for BusLogSink {
    async fn emit(&self, message: &str) {
        let line = LogMessage::new(message);
        let payload = match serde_json::to_vec(&line) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to encode log line: {}", e);
                return;
            }
        };

        if let Err(e) = self.bus.publish(&Channels::deploy_logs(&self.slug), payload).await {
            warn!("Failed to publish log line: {}", e);
        }
    }

    async fn emit_status(&self, status: BuildStatus, exit_code: Option<i32>) {
        let message = StatusMessage { status, exit_code };
        let payload = match serde_json::to_vec(&message) {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to encode status message: {}", e);
                return;
            }
        };

        if let Err(e) = self.bus.publish(&Channels::deploy_status(&self.slug), payload).await {
            warn!("Failed to publish status: {}", e);
        }
    }
}
