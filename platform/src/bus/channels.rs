//! Log bus channel naming
//!
//! One log channel and one status channel per deployment, both keyed by the
//! deployment slug. The relay subscribes to the wildcard patterns once and
//! recovers the slug from each incoming channel name.

/// Channel name patterns for the log bus
pub struct Channels;

impl Channels {
    /// Log channel for one deployment
    pub fn deploy_logs(slug: &str) -> String {
        format!("skydock/deploys/{}/logs", slug)
    }

    /// Status channel for one deployment
    pub fn deploy_status(slug: &str) -> String {
        format!("skydock/deploys/{}/status", slug)
    }

    /// Wildcard pattern covering every deployment's log channel
    pub fn logs_pattern() -> &'static str {
        "skydock/deploys/+/logs"
    }

    /// Wildcard pattern covering every deployment's status channel
    pub fn status_pattern() -> &'static str {
        "skydock/deploys/+/status"
    }

    /// Extract the deployment slug from a channel name
    pub fn parse_slug(channel: &str) -> Option<String> {
        let parts: Vec<&str> = channel.split('/').collect();
        if parts.len() == 4 && parts[0] == "skydock" && parts[1] == "deploys" && !parts[2].is_empty() {
            Some(parts[2].to_string())
        } else {
            None
        }
    }

    /// Check if a channel carries log lines
    pub fn is_logs_channel(channel: &str) -> bool {
        channel.ends_with("/logs") && Self::parse_slug(channel).is_some()
    }

    /// Check if a channel carries status messages
    pub fn is_status_channel(channel: &str) -> bool {
        channel.ends_with("/status") && Self::parse_slug(channel).is_some()
    }
}
