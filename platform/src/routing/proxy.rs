//! Artifact reverse proxy
//!
//! Maps an inbound hostname's subdomain to a storage key prefix and
//! forwards the rewritten request to the artifact store's HTTP origin,
//! preserving method, headers and body. No caching, no TLS termination,
//! no per-subdomain authorization.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use reqwest::Client;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};
use url::Url;

use crate::errors::PipelineError;
use crate::routing::rewrite::{rewrite_path, subdomain_of};
use crate::settings::StoreSettings;

/// Request body size cap while proxying
const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Headers owned by the transport on either side of the proxy
const HOP_BY_HOP_HEADERS: &[HeaderName] = &[
    header::CONNECTION,
    header::HOST,
    header::CONTENT_LENGTH,
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// Router process state
pub struct RouterState {
    client: Client,
    origin: String,
    bucket: String,
}

impl RouterState {
    pub fn new(settings: &StoreSettings) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            origin: settings.origin.trim_end_matches('/').to_string(),
            bucket: settings.bucket.clone(),
        })
    }
}

/// Build the artifact router
pub fn build_router(state: Arc<RouterState>) -> Router {
    Router::new()
        .fallback(proxy_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Forward one request to the artifact store
pub async fn proxy_handler(
    State(state): State<Arc<RouterState>>,
    request: Request,
) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    let subdomain = subdomain_of(host);

    if subdomain.is_none() {
        debug!("No routable subdomain in host: {:?}", host);
    }

    let key_path = rewrite_path(subdomain.as_deref(), request.uri().path());
    let mut target = match Url::parse(&format!("{}/{}/{}", state.origin, state.bucket, key_path)) {
        Ok(target) => target,
        Err(e) => {
            error!("Invalid proxy target for {}: {}", key_path, e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };
    target.set_query(request.uri().query());

    debug!("Proxying {} {} -> {}", request.method(), request.uri().path(), target);

    let method = request.method().clone();
    let headers = filter_headers(request.headers());

    let body = match axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(_) => return StatusCode::PAYLOAD_TOO_LARGE.into_response(),
    };

    let upstream = match state
        .client
        .request(method, target)
        .headers(headers)
        .body(body)
        .send()
        .await
    {
        Ok(upstream) => upstream,
        Err(e) => {
            error!("Artifact store unreachable: {}", e);
            return (StatusCode::BAD_GATEWAY, "artifact store unreachable").into_response();
        }
    };

    let status = upstream.status();
    let response_headers = filter_headers(upstream.headers());

    let bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Failed to read artifact store response: {}", e);
            return (StatusCode::BAD_GATEWAY, "artifact store unreachable").into_response();
        }
    };

    let mut response = Response::builder().status(status);
    if let Some(headers) = response.headers_mut() {
        *headers = response_headers;
    }
    response
        .body(Body::from(bytes))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn filter_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = HeaderMap::new();
    for (name, value) in headers {
        if !HOP_BY_HOP_HEADERS.contains(name) {
            filtered.append(name, value.clone());
        }
    }
    filtered
}
