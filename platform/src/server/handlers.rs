//! Gateway HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::errors::PipelineError;
use crate::launcher::LaunchEnv;
use crate::server::state::ServerState;
use crate::slug;
use crate::utils::version_info;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    let version = version_info();
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "skydock-gateway".to_string(),
        version: version.version,
    })
}

/// Version response
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Deployment submission request
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Repository URL to build
    pub source_location: Option<String>,

    /// Client-supplied deployment identifier; generated when absent
    #[serde(default)]
    pub slug: Option<String>,
}

/// Successful submission response
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub status: String,
    pub slug: String,
    pub url: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
}

/// Deployment submission handler.
///
/// Validates the request, resolves the deployment identity and hands the
/// launch to the build runner. Fire-and-forget: the response is `queued`
/// as soon as the runner accepts the launch; build progress is observable
/// only through the log stream.
pub async fn submit_handler(
    State(state): State<Arc<ServerState>>,
    Json(request): Json<SubmitRequest>,
) -> Response {
    let source_location = match request.source_location {
        Some(location) if !location.trim().is_empty() => location,
        _ => {
            let e = PipelineError::MissingInput("source_location is required".to_string());
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    status: "error".to_string(),
                    message: e.to_string(),
                }),
            )
                .into_response();
        }
    };

    let deployment_id = request.slug.unwrap_or_else(slug::generate);

    let env = LaunchEnv {
        source_location,
        deployment_id: deployment_id.clone(),
    };

    match state.runner.launch(&state.profile, &env).await {
        Ok(()) => {
            info!("Queued deployment: {}", deployment_id);
            (
                StatusCode::OK,
                Json(SubmitResponse {
                    status: "queued".to_string(),
                    slug: deployment_id.clone(),
                    url: format!("http://{}.{}", deployment_id, state.app_domain),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!("Launch failed for {}: {}", deployment_id, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    status: "error".to_string(),
                    message: e.to_string(),
                }),
            )
                .into_response()
        }
    }
}
