//! Admission endpoint unit tests

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use skydock::errors::PipelineError;
use skydock::launcher::{BuildRunner, LaunchEnv, LaunchProfile};
use skydock::server::rooms::LogRooms;
use skydock::server::serve::build_router;
use skydock::server::state::ServerState;
use skydock::settings::LaunchSettings;

/// Build runner recording every launch request
struct RecordingRunner {
    launches: Mutex<Vec<LaunchEnv>>,
    reject: bool,
}

impl RecordingRunner {
    fn new(reject: bool) -> Arc<Self> {
        Arc::new(Self {
            launches: Mutex::new(Vec::new()),
            reject,
        })
    }

    fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }
}

#[async_trait]
impl BuildRunner for RecordingRunner {
    async fn launch(&self, _profile: &LaunchProfile, env: &LaunchEnv) -> Result<(), PipelineError> {
        self.launches.lock().unwrap().push(env.clone());
        if self.reject {
            return Err(PipelineError::LaunchRejected("no capacity".to_string()));
        }
        Ok(())
    }
}

fn test_state(runner: Arc<RecordingRunner>) -> Arc<ServerState> {
    Arc::new(ServerState::new(
        runner,
        Arc::new(LogRooms::new(16)),
        LaunchProfile::from(&LaunchSettings::default()),
        "skydock.test".to_string(),
    ))
}

fn submit_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/deployments")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_source_location_is_client_error() {
    let runner = RecordingRunner::new(false);
    let app = build_router(test_state(runner.clone()));

    let response = app
        .oneshot(submit_request(serde_json::json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = response_json(response).await;
    assert_eq!(body["status"], "error");

    // Validation failure must not reach the launch contract
    assert_eq!(runner.launch_count(), 0);
}

#[tokio::test]
async fn test_empty_source_location_is_client_error() {
    let runner = RecordingRunner::new(false);
    let app = build_router(test_state(runner.clone()));

    let response = app
        .oneshot(submit_request(serde_json::json!({ "source_location": "  " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(runner.launch_count(), 0);
}

#[tokio::test]
async fn test_supplied_slug_appears_as_subdomain() {
    let runner = RecordingRunner::new(false);
    let app = build_router(test_state(runner.clone()));

    let response = app
        .oneshot(submit_request(serde_json::json!({
            "source_location": "https://github.com/acme/site.git",
            "slug": "my-site",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["status"], "queued");
    assert_eq!(body["slug"], "my-site");
    assert_eq!(body["url"], "http://my-site.skydock.test");

    // The same identity flows into the launch environment
    let launches = runner.launches.lock().unwrap();
    assert_eq!(launches.len(), 1);
    assert_eq!(launches[0].deployment_id, "my-site");
    assert_eq!(launches[0].source_location, "https://github.com/acme/site.git");
}

#[tokio::test]
async fn test_generated_slug_is_used_consistently() {
    let runner = RecordingRunner::new(false);
    let app = build_router(test_state(runner.clone()));

    let response = app
        .oneshot(submit_request(serde_json::json!({
            "source_location": "https://github.com/acme/site.git",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;

    let slug = body["slug"].as_str().unwrap().to_string();
    assert!(!slug.is_empty());
    assert_eq!(body["url"], format!("http://{}.skydock.test", slug));

    let launches = runner.launches.lock().unwrap();
    assert_eq!(launches[0].deployment_id, slug);
}

#[tokio::test]
async fn test_launch_rejection_is_server_error() {
    let runner = RecordingRunner::new(true);
    let app = build_router(test_state(runner.clone()));

    let response = app
        .oneshot(submit_request(serde_json::json!({
            "source_location": "https://github.com/acme/site.git",
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response_json(response).await;
    assert_eq!(body["status"], "error");

    // A single attempt, no retry
    assert_eq!(runner.launch_count(), 1);
}
