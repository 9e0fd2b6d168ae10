//! Live log relay worker
//!
//! Bridges the log bus to the viewer rooms: subscribes once to the
//! wildcard log and status patterns, recovers the deployment slug from
//! each incoming channel and re-emits the message into the matching room.
//! Messages arriving while no viewer is joined are dropped; there is no
//! replay.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::bus::channels::Channels;
use crate::bus::client::{BusAddress, BusMessage, BusSubscriber};
use crate::models::deployment::{LogMessage, StatusMessage, ViewerEvent};
use crate::server::rooms::LogRooms;
use crate::utils::{calc_exp_backoff, CooldownOptions};

/// Relay worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Log bus broker address
    pub bus: BusAddress,

    /// Reconnect backoff on failure
    pub reconnect: CooldownOptions,

    /// Max reconnect attempts before giving up
    pub max_reconnect_attempts: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            bus: BusAddress::default(),
            reconnect: CooldownOptions::default(),
            max_reconnect_attempts: 10,
        }
    }
}

/// Run the relay worker
pub async fn run(
    options: &Options,
    rooms: Arc<LogRooms>,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) {
    info!("Relay worker starting...");

    let mut reconnect_attempts = 0;

    loop {
        // Check for shutdown before attempting connection
        tokio::select! {
            _ = &mut shutdown_signal => {
                info!("Relay worker shutting down...");
                return;
            }
            _ = async {} => {}
        }

        let client_id = format!("skydock-relay-{}", uuid::Uuid::new_v4());

        info!(
            "Connecting to log bus: {}:{}",
            options.bus.host, options.bus.port
        );
        let mut subscriber = match BusSubscriber::connect(&options.bus, &client_id) {
            Ok(subscriber) => subscriber,
            Err(e) => {
                error!("Failed to create bus subscriber: {}", e);
                reconnect_attempts += 1;
                if reconnect_attempts >= options.max_reconnect_attempts {
                    error!("Max reconnect attempts reached, giving up");
                    return;
                }
                tokio::time::sleep(calc_exp_backoff(&options.reconnect, reconnect_attempts)).await;
                continue;
            }
        };

        let subscribed = subscriber.subscribe_pattern(Channels::logs_pattern()).await.is_ok()
            && subscriber.subscribe_pattern(Channels::status_pattern()).await.is_ok();
        if !subscribed {
            error!("Failed to subscribe to log bus patterns");
            reconnect_attempts += 1;
            tokio::time::sleep(calc_exp_backoff(&options.reconnect, reconnect_attempts)).await;
            continue;
        }

        reconnect_attempts = 0;
        info!("Relay worker connected and subscribed");

        // Main event loop
        loop {
            tokio::select! {
                _ = &mut shutdown_signal => {
                    info!("Relay worker shutting down...");
                    return;
                }
                polled = subscriber.poll() => {
                    match polled {
                        Ok(Some(message)) => {
                            relay_message(&message, rooms.as_ref()).await;
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Bus poll error: {}, reconnecting...", e);
                            break;
                        }
                    }
                }
            }
        }

        tokio::time::sleep(calc_exp_backoff(&options.reconnect, reconnect_attempts)).await;
    }
}

async fn relay_message(message: &BusMessage, rooms: &LogRooms) {
    let Some(slug) = Channels::parse_slug(&message.channel) else {
        warn!("Dropping message on unroutable channel: {}", message.channel);
        return;
    };

    if Channels::is_logs_channel(&message.channel) {
        // Forward the line even when the payload is not the expected JSON
        let text = match message.parse_json::<LogMessage>() {
            Ok(line) => line.message,
            Err(_) => String::from_utf8_lossy(&message.payload).to_string(),
        };
        rooms
            .publish(
                &slug,
                ViewerEvent::Log {
                    deployment_id: slug.clone(),
                    message: text,
                },
            )
            .await;
    } else if Channels::is_status_channel(&message.channel) {
        match message.parse_json::<StatusMessage>() {
            Ok(status) => {
                rooms
                    .publish(
                        &slug,
                        ViewerEvent::Status {
                            deployment_id: slug.clone(),
                            status: status.status,
                            exit_code: status.exit_code,
                        },
                    )
                    .await;
            }
            Err(e) => {
                debug!("Dropping malformed status message for {}: {}", slug, e);
            }
        }
    }
}
