//! Viewer socket endpoint
//!
//! A viewer connects, declares interest in one or more deployment
//! identifiers and receives each deployment's events as JSON text frames.
//! Joining is idempotent: a repeated join for the same identifier is
//! re-acknowledged without duplicating delivery.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::deployment::ViewerEvent;
use crate::server::state::ServerState;

/// Command sent by a viewer over the socket
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum ViewerCommand {
    /// Declare interest in one deployment's events
    Join { deployment_id: String },
}

/// Socket upgrade handler for `/logs/ws`
pub async fn logs_ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<ServerState>) {
    let (mut sender, mut receiver) = socket.split();

    // Events from all joined rooms funnel through one ordered queue
    let (event_tx, mut event_rx) = mpsc::channel::<ViewerEvent>(64);
    let mut joined: HashMap<String, JoinHandle<()>> = HashMap::new();

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        handle_command(text.as_str(), &state, &event_tx, &mut joined).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("Viewer socket error: {}", e);
                        break;
                    }
                }
            }
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Failed to encode viewer event: {}", e);
                        continue;
                    }
                };
                if sender.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    for (_, forwarder) in joined {
        forwarder.abort();
    }
}

async fn handle_command(
    text: &str,
    state: &Arc<ServerState>,
    event_tx: &mpsc::Sender<ViewerEvent>,
    joined: &mut HashMap<String, JoinHandle<()>>,
) {
    let command: ViewerCommand = match serde_json::from_str(text) {
        Ok(command) => command,
        Err(_) => {
            let _ = event_tx
                .send(ViewerEvent::Error {
                    message: "unrecognized command".to_string(),
                })
                .await;
            return;
        }
    };

    match command {
        ViewerCommand::Join { deployment_id } => {
            if !joined.contains_key(&deployment_id) {
                let mut room_rx = state.rooms.join(&deployment_id).await;
                let tx = event_tx.clone();

                let forwarder = tokio::spawn(async move {
                    loop {
                        match room_rx.recv().await {
                            Ok(event) => {
                                if tx.send(event).await.is_err() {
                                    break;
                                }
                            }
                            // Slow viewer: oldest events were dropped, keep going
                            Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                                debug!("Viewer lagged, {} events dropped", skipped);
                            }
                            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        }
                    }
                });

                joined.insert(deployment_id.clone(), forwarder);
            }

            debug!("Viewer joined: {}", deployment_id);
            let _ = event_tx.send(ViewerEvent::Joined { deployment_id }).await;
        }
    }
}
