//! Gateway server state

use std::sync::Arc;

use crate::launcher::{BuildRunner, LaunchProfile};
use crate::server::rooms::LogRooms;

/// Server state shared across handlers
pub struct ServerState {
    pub runner: Arc<dyn BuildRunner>,
    pub rooms: Arc<LogRooms>,
    pub profile: LaunchProfile,
    pub app_domain: String,
}

impl ServerState {
    pub fn new(
        runner: Arc<dyn BuildRunner>,
        rooms: Arc<LogRooms>,
        profile: LaunchProfile,
        app_domain: String,
    ) -> Self {
        Self {
            runner,
            rooms,
            profile,
            app_domain,
        }
    }
}
