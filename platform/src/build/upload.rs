//! Artifact upload

use std::path::Path;

use walkdir::WalkDir;

use crate::build::sink::LogSink;
use crate::errors::PipelineError;
use crate::store::{artifact_key, ObjectStore};

/// Content type for an artifact, derived from its file extension
pub fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Upload every file under `output_dir`, keyed by the deployment slug and
/// the file's path relative to `output_dir`. Directory entries are skipped.
/// The first failed upload halts the walk. Returns the number uploaded.
pub async fn upload_artifacts(
    output_dir: &Path,
    slug: &str,
    store: &dyn ObjectStore,
    sink: &dyn LogSink,
) -> Result<usize, PipelineError> {
    let mut uploaded = 0;

    for entry in WalkDir::new(output_dir) {
        let entry = entry.map_err(|e| PipelineError::UploadFailed(e.to_string()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry
            .path()
            .strip_prefix(output_dir)
            .map_err(|e| PipelineError::Internal(e.to_string()))?
            .to_string_lossy()
            .to_string();

        sink.emit(&format!("Uploading {}", relative)).await;

        let content = tokio::fs::read(entry.path())
            .await
            .map_err(|e| PipelineError::UploadFailed(format!("{}: {}", relative, e)))?;
        let content_type = content_type_for(entry.path());
        let key = artifact_key(slug, &relative);

        store
            .put(&key, content, &content_type)
            .await
            .map_err(|e| PipelineError::UploadFailed(format!("{}: {}", relative, e)))?;

        sink.emit(&format!("Uploaded {}", relative)).await;
        uploaded += 1;
    }

    Ok(uploaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_content_type_from_extension() {
        assert_eq!(content_type_for(&PathBuf::from("index.html")), "text/html");
        assert_eq!(content_type_for(&PathBuf::from("style.css")), "text/css");
        assert_eq!(content_type_for(&PathBuf::from("logo.png")), "image/png");
    }

    #[test]
    fn test_unknown_extension_falls_back_to_binary() {
        assert_eq!(
            content_type_for(&PathBuf::from("blob.xyzzy")),
            "application/octet-stream"
        );
        assert_eq!(
            content_type_for(&PathBuf::from("no_extension")),
            "application/octet-stream"
        );
    }
}
