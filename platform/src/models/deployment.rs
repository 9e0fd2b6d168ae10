//! Deployment models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conceptual deployment status.
///
/// Carried only on the per-deployment status channel; no durable status
/// record exists anywhere in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    /// Admission accepted, build not yet started
    Queued,

    /// The build command is running
    Building,

    /// Artifacts uploaded, deployment servable
    Succeeded,

    /// The build terminated on a fatal error
    Failed,
}

/// A single log line published on a deployment's log channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMessage {
    /// Free-text log content
    pub message: String,

    /// Emission time at the orchestrator
    pub timestamp: DateTime<Utc>,
}

impl LogMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Progress or terminal status published on a deployment's status channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub status: BuildStatus,

    /// Exit code of the build command, when one is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

/// Event pushed to a joined viewer over the realtime socket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewerEvent {
    /// Acknowledgement of a join request
    Joined { deployment_id: String },

    /// One build log line
    Log { deployment_id: String, message: String },

    /// Build status change
    Status {
        deployment_id: String,
        status: BuildStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        exit_code: Option<i32>,
    },

    /// Protocol-level error, e.g. an unrecognized command
    Error { message: String },
}
