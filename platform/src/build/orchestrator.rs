//! Build orchestration state machine

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::build::command::run_streamed;
use crate::build::sink::LogSink;
use crate::build::upload::upload_artifacts;
use crate::errors::PipelineError;
use crate::models::deployment::BuildStatus;
use crate::settings::BuilderSettings;
use crate::store::ObjectStore;

/// Orchestrates one deployment's build, sequentially:
/// validate environment, locate source, install+build, validate output,
/// upload. Any failure is terminal; the hosting process converts the error
/// into a non-zero exit code.
pub struct Orchestrator {
    settings: BuilderSettings,
    store: Arc<dyn ObjectStore>,
    sink: Arc<dyn LogSink>,
}

impl Orchestrator {
    pub fn new(
        settings: BuilderSettings,
        store: Arc<dyn ObjectStore>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            settings,
            store,
            sink,
        }
    }

    /// Run the full build pipeline. On failure an `ERROR:`-prefixed log
    /// line and a terminal status message are emitted before returning.
    pub async fn run(&self) -> Result<(), PipelineError> {
        let result = self.execute().await;

        if let Err(e) = &result {
            self.sink.emit(&format!("ERROR: {}", e)).await;
            let exit_code = match e {
                PipelineError::BuildFailed { code } => Some(*code),
                _ => None,
            };
            self.sink.emit_status(BuildStatus::Failed, exit_code).await;
        }

        result
    }

    async fn execute(&self) -> Result<(), PipelineError> {
        let slug = self.validate_environment()?;

        info!("Starting build for deployment: {}", slug);
        self.sink.emit("Build started...").await;
        self.sink.emit_status(BuildStatus::Building, None).await;

        let source_dir = self.locate_source().await?;
        self.sink
            .emit(&format!("Building in: {}", source_dir.display()))
            .await;

        self.sink
            .emit(&format!("Running: {}", self.settings.build_command))
            .await;
        let code = run_streamed(&self.settings.build_command, &source_dir, self.sink.as_ref()).await?;
        if code != 0 {
            return Err(PipelineError::BuildFailed { code });
        }
        self.sink.emit("Build completed successfully.").await;

        let output_dir = self.validate_output(&source_dir).await?;

        self.sink.emit("Uploading artifacts...").await;
        let uploaded = upload_artifacts(&output_dir, &slug, self.store.as_ref(), self.sink.as_ref()).await?;

        if uploaded == 0 {
            warn!("No files found in {} to upload", output_dir.display());
            self.sink
                .emit(&format!(
                    "WARNING: no files found in {} to upload.",
                    output_dir.display()
                ))
                .await;
        } else {
            self.sink
                .emit(&format!("All {} files uploaded.", uploaded))
                .await;
        }

        self.sink.emit("Done.").await;
        self.sink.emit_status(BuildStatus::Succeeded, Some(0)).await;

        info!("Build complete for deployment: {}", slug);
        Ok(())
    }

    fn validate_environment(&self) -> Result<String, PipelineError> {
        match &self.settings.deployment_id {
            Some(id) if !id.trim().is_empty() => Ok(id.clone()),
            _ => Err(PipelineError::MissingIdentity(
                "DEPLOYMENT_ID environment variable is not set".to_string(),
            )),
        }
    }

    async fn locate_source(&self) -> Result<PathBuf, PipelineError> {
        let source_dir = self.settings.source_dir.clone();

        let mut entries = match tokio::fs::read_dir(&source_dir).await {
            Ok(entries) => entries,
            Err(_) => {
                return Err(PipelineError::SourceNotFound(format!(
                    "source directory not found at {}",
                    source_dir.display()
                )))
            }
        };

        if entries.next_entry().await?.is_none() {
            return Err(PipelineError::SourceNotFound(format!(
                "source directory is empty at {}",
                source_dir.display()
            )));
        }

        Ok(source_dir)
    }

    async fn validate_output(&self, source_dir: &Path) -> Result<PathBuf, PipelineError> {
        let output_dir = source_dir.join(&self.settings.output_dir);

        match tokio::fs::metadata(&output_dir).await {
            Ok(meta) if meta.is_dir() => Ok(output_dir),
            _ => Err(PipelineError::OutputMissing(format!(
                "expected build output directory at {}",
                output_dir.display()
            ))),
        }
    }
}
