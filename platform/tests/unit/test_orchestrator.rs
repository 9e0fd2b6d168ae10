//! Build orchestrator unit tests

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tempfile::TempDir;

use skydock::build::orchestrator::Orchestrator;
use skydock::build::sink::LogSink;
use skydock::errors::PipelineError;
use skydock::models::deployment::BuildStatus;
use skydock::settings::BuilderSettings;
use skydock::store::ObjectStore;

/// Log sink recording every emitted line and status
#[derive(Default)]
struct RecordingSink {
    lines: Mutex<Vec<String>>,
    statuses: Mutex<Vec<(BuildStatus, Option<i32>)>>,
}

impl RecordingSink {
    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    fn last_status(&self) -> Option<(BuildStatus, Option<i32>)> {
        self.statuses.lock().unwrap().last().copied()
    }
}

#[async_trait]
impl LogSink for RecordingSink {
    async fn emit(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }

    async fn emit_status(&self, status: BuildStatus, exit_code: Option<i32>) {
        self.statuses.lock().unwrap().push((status, exit_code));
    }
}

/// Object store recording every put, optionally failing each one
#[derive(Default)]
struct RecordingStore {
    puts: Mutex<Vec<(String, Vec<u8>, String)>>,
    fail: bool,
}

impl RecordingStore {
    fn put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn put(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<(), PipelineError> {
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), content, content_type.to_string()));
        if self.fail {
            return Err(PipelineError::StorageError("store offline".to_string()));
        }
        Ok(())
    }
}

fn settings(source_dir: &Path, build_command: &str) -> BuilderSettings {
    BuilderSettings {
        deployment_id: Some("demo".to_string()),
        source_dir: source_dir.to_path_buf(),
        build_command: build_command.to_string(),
        ..Default::default()
    }
}

/// Source tree with one placeholder file, as the entrypoint's clone leaves it
fn seeded_source(tmp: &TempDir) -> std::path::PathBuf {
    let source_dir = tmp.path().join("output");
    std::fs::create_dir_all(&source_dir).unwrap();
    std::fs::write(source_dir.join("package.json"), "{}").unwrap();
    source_dir
}

fn orchestrator(
    settings: BuilderSettings,
) -> (Orchestrator, Arc<RecordingStore>, Arc<RecordingSink>) {
    let store = Arc::new(RecordingStore::default());
    let sink = Arc::new(RecordingSink::default());
    (
        Orchestrator::new(settings, store.clone(), sink.clone()),
        store,
        sink,
    )
}

#[tokio::test]
async fn test_missing_identity_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let source_dir = seeded_source(&tmp);

    let mut builder_settings = settings(&source_dir, "true");
    builder_settings.deployment_id = None;
    let (orchestrator, store, sink) = orchestrator(builder_settings);

    let result = orchestrator.run().await;

    assert!(matches!(result, Err(PipelineError::MissingIdentity(_))));
    assert_eq!(store.put_count(), 0);
    assert!(sink.lines().iter().any(|line| line.starts_with("ERROR:")));
    assert_eq!(sink.last_status(), Some((BuildStatus::Failed, None)));
}

#[tokio::test]
async fn test_missing_source_tree_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let missing = tmp.path().join("nowhere");

    let (orchestrator, store, sink) = orchestrator(settings(&missing, "true"));
    let result = orchestrator.run().await;

    assert!(matches!(result, Err(PipelineError::SourceNotFound(_))));
    assert_eq!(store.put_count(), 0);
    assert!(sink.lines().iter().any(|line| line.starts_with("ERROR:")));
}

#[tokio::test]
async fn test_empty_source_tree_is_fatal() {
    let tmp = TempDir::new().unwrap();
    let source_dir = tmp.path().join("output");
    std::fs::create_dir_all(&source_dir).unwrap();

    let (orchestrator, _, _) = orchestrator(settings(&source_dir, "true"));
    let result = orchestrator.run().await;

    assert!(matches!(result, Err(PipelineError::SourceNotFound(_))));
}

#[tokio::test]
async fn test_build_output_is_streamed_in_order() {
    let tmp = TempDir::new().unwrap();
    let source_dir = seeded_source(&tmp);

    let (orchestrator, _, sink) = orchestrator(settings(
        &source_dir,
        "echo first line; echo second line; mkdir -p dist; echo done > dist/done.txt",
    ));
    orchestrator.run().await.unwrap();

    let lines = sink.lines();
    let first = lines.iter().position(|l| l == "first line").unwrap();
    let second = lines.iter().position(|l| l == "second line").unwrap();
    assert!(first < second);
}

#[tokio::test]
async fn test_stderr_lines_are_forwarded() {
    let tmp = TempDir::new().unwrap();
    let source_dir = seeded_source(&tmp);

    let (orchestrator, _, sink) = orchestrator(settings(
        &source_dir,
        "echo warning from stderr >&2; mkdir -p dist; echo ok > dist/ok.txt",
    ));
    orchestrator.run().await.unwrap();

    assert!(sink.lines().iter().any(|l| l == "warning from stderr"));
}

#[tokio::test]
async fn test_failing_build_uploads_nothing() {
    let tmp = TempDir::new().unwrap();
    let source_dir = seeded_source(&tmp);

    let (orchestrator, store, sink) = orchestrator(settings(&source_dir, "echo compiling; exit 3"));
    let result = orchestrator.run().await;

    assert!(matches!(result, Err(PipelineError::BuildFailed { code: 3 })));
    assert_eq!(store.put_count(), 0);
    assert!(sink.lines().iter().any(|line| line.starts_with("ERROR:")));
    assert_eq!(sink.last_status(), Some((BuildStatus::Failed, Some(3))));
}

#[tokio::test]
async fn test_missing_output_directory_is_distinct_from_build_failure() {
    let tmp = TempDir::new().unwrap();
    let source_dir = seeded_source(&tmp);

    // The build command succeeds but produces no output directory
    let (orchestrator, store, _) = orchestrator(settings(&source_dir, "true"));
    let result = orchestrator.run().await;

    assert!(matches!(result, Err(PipelineError::OutputMissing(_))));
    assert_eq!(store.put_count(), 0);
}

#[tokio::test]
async fn test_empty_output_directory_warns_and_succeeds() {
    let tmp = TempDir::new().unwrap();
    let source_dir = seeded_source(&tmp);

    let (orchestrator, store, sink) = orchestrator(settings(&source_dir, "mkdir -p dist"));
    let result = orchestrator.run().await;

    assert!(result.is_ok());
    assert_eq!(store.put_count(), 0);
    assert!(sink.lines().iter().any(|line| line.starts_with("WARNING:")));
    assert_eq!(sink.last_status(), Some((BuildStatus::Succeeded, Some(0))));
}

#[tokio::test]
async fn test_artifacts_round_trip_with_keys_and_content_types() {
    let tmp = TempDir::new().unwrap();
    let source_dir = seeded_source(&tmp);

    let (orchestrator, store, sink) = orchestrator(settings(
        &source_dir,
        "mkdir -p dist/assets && printf '<html></html>' > dist/index.html && printf 'console.log(1)' > dist/assets/app.js",
    ));
    orchestrator.run().await.unwrap();

    let puts = store.puts.lock().unwrap();
    assert_eq!(puts.len(), 2);

    let index = puts
        .iter()
        .find(|(key, _, _)| key == "outputs/demo/index.html")
        .expect("index.html uploaded under the deployment prefix");
    assert_eq!(index.1, b"<html></html>");
    assert_eq!(index.2, "text/html");

    let script = puts
        .iter()
        .find(|(key, _, _)| key == "outputs/demo/assets/app.js")
        .expect("nested asset uploaded under its relative path");
    assert_eq!(script.1, b"console.log(1)");
    assert!(script.2.contains("javascript"));

    assert_eq!(sink.last_status(), Some((BuildStatus::Succeeded, Some(0))));
}

#[tokio::test]
async fn test_upload_failure_halts_remaining_uploads() {
    let tmp = TempDir::new().unwrap();
    let source_dir = seeded_source(&tmp);

    let store = Arc::new(RecordingStore {
        puts: Mutex::new(Vec::new()),
        fail: true,
    });
    let sink = Arc::new(RecordingSink::default());
    let orchestrator = Orchestrator::new(
        settings(
            &source_dir,
            "mkdir -p dist && echo a > dist/a.txt && echo b > dist/b.txt",
        ),
        store.clone(),
        sink.clone(),
    );

    let result = orchestrator.run().await;

    assert!(matches!(result, Err(PipelineError::UploadFailed(_))));
    assert_eq!(store.put_count(), 1);
    assert_eq!(sink.last_status(), Some((BuildStatus::Failed, None)));
}
