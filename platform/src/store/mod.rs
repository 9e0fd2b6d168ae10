//! Object store contract
//!
//! Key-addressed blob storage for published artifacts. Keys are namespaced
//! `outputs/<slug>/<relativePath>`; blobs are written once and never
//! mutated or deleted by the pipeline.

use async_trait::async_trait;

use crate::errors::PipelineError;

pub mod http;

/// Fixed key prefix under which every deployment's artifacts live
pub const OUTPUT_PREFIX: &str = "outputs";

/// Storage key for one artifact of one deployment
pub fn artifact_key(slug: &str, relative_path: &str) -> String {
    format!("{}/{}/{}", OUTPUT_PREFIX, slug, relative_path)
}

/// Contract with the durable artifact store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store one immutable blob under `key`
    async fn put(&self, key: &str, content: Vec<u8>, content_type: &str) -> Result<(), PipelineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_key() {
        assert_eq!(
            artifact_key("quiet-harbor-x4k2", "assets/app.js"),
            "outputs/quiet-harbor-x4k2/assets/app.js"
        );
    }
}
