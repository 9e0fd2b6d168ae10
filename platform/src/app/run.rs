//! Gateway run loop

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::app::options::AppOptions;
use crate::errors::PipelineError;
use crate::launcher::http::HttpRunner;
use crate::launcher::LaunchProfile;
use crate::server::rooms::LogRooms;
use crate::server::serve::serve;
use crate::server::state::ServerState;
use crate::workers::relay;

/// Run the skydock gateway
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), PipelineError> {
    info!("Initializing skydock gateway...");

    // Create shutdown channel
    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager =
        ShutdownManager::new(shutdown_tx.clone(), options.max_shutdown_delay);

    // Initialize workers and server
    if let Err(e) = init(&options, shutdown_tx.clone(), &mut shutdown_manager).await {
        error!("Failed to start gateway: {}", e);
        shutdown_manager.shutdown().await?;
        return Err(e);
    }

    // Wait for shutdown
    tokio::select! {
        _ = shutdown_signal => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    drop(shutdown_tx);
    shutdown_manager.shutdown().await
}

// =============================== INITIALIZATION ================================== //

async fn init(
    options: &AppOptions,
    shutdown_tx: broadcast::Sender<()>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<(), PipelineError> {
    let rooms = Arc::new(LogRooms::new(options.rooms_capacity));

    let runner = Arc::new(HttpRunner::new(&options.launcher.origin)?);
    let state = Arc::new(ServerState::new(
        runner,
        rooms.clone(),
        LaunchProfile::from(&options.launcher),
        options.app_domain.clone(),
    ));

    init_relay_worker(
        options.relay_worker.clone(),
        rooms,
        shutdown_manager,
        shutdown_tx.subscribe(),
    )?;

    init_socket_server(options, state, shutdown_manager, shutdown_tx.subscribe()).await?;

    Ok(())
}

fn init_relay_worker(
    options: relay::Options,
    rooms: Arc<LogRooms>,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), PipelineError> {
    info!("Initializing relay worker...");

    let relay_handle = tokio::spawn(async move {
        relay::run(
            &options,
            rooms,
            Box::pin(async move {
                let _ = shutdown_rx.recv().await;
            }),
        )
        .await;
    });

    shutdown_manager.with_relay_worker_handle(relay_handle)?;
    Ok(())
}

async fn init_socket_server(
    options: &AppOptions,
    state: Arc<ServerState>,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), PipelineError> {
    info!("Initializing gateway HTTP server...");

    let server_handle = serve(&options.server, state, async move {
        let _ = shutdown_rx.recv().await;
    })
    .await?;

    shutdown_manager.with_socket_server_handle(server_handle)?;
    Ok(())
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    max_shutdown_delay: Duration,
    relay_worker_handle: Option<JoinHandle<()>>,
    socket_server_handle: Option<JoinHandle<Result<(), PipelineError>>>,
}

impl ShutdownManager {
    pub fn new(shutdown_tx: broadcast::Sender<()>, max_shutdown_delay: Duration) -> Self {
        Self {
            shutdown_tx,
            max_shutdown_delay,
            relay_worker_handle: None,
            socket_server_handle: None,
        }
    }

    pub fn with_relay_worker_handle(&mut self, handle: JoinHandle<()>) -> Result<(), PipelineError> {
        if self.relay_worker_handle.is_some() {
            return Err(PipelineError::ShutdownError("relay_handle already set".to_string()));
        }
        self.relay_worker_handle = Some(handle);
        Ok(())
    }

    pub fn with_socket_server_handle(
        &mut self,
        handle: JoinHandle<Result<(), PipelineError>>,
    ) -> Result<(), PipelineError> {
        if self.socket_server_handle.is_some() {
            return Err(PipelineError::ShutdownError("server_handle already set".to_string()));
        }
        self.socket_server_handle = Some(handle);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), PipelineError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(self.max_shutdown_delay, self.shutdown_impl()).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, forcing shutdown...",
                    self.max_shutdown_delay
                );
                std::process::exit(1);
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), PipelineError> {
        info!("Shutting down skydock gateway...");

        // 1. Relay worker
        if let Some(handle) = self.relay_worker_handle.take() {
            handle
                .await
                .map_err(|e| PipelineError::ShutdownError(e.to_string()))?;
        }

        // 2. Socket server
        if let Some(handle) = self.socket_server_handle.take() {
            handle
                .await
                .map_err(|e| PipelineError::ShutdownError(e.to_string()))??;
        }

        info!("Shutdown complete");
        Ok(())
    }
}
