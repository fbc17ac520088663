use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use scholia_core::document::Document;
use scholia_core::storage::storage_key;

/// Write-once JSON copies of parse results, one file per document id.
///
/// Purely informational: nothing downstream reads these files back, so
/// every failure is logged and swallowed.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    root: PathBuf,
}

impl ArtifactCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, doc_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", storage_key(doc_id)))
    }

    /// Returns true only when this call created the artifact.
    pub async fn store(&self, doc: &Document) -> bool {
        let path = self.path_for(&doc.id);
        let body = match serde_json::to_vec_pretty(doc) {
            Ok(body) => body,
            Err(e) => {
                warn!(doc_id = %doc.id, error = %e, "Failed to serialize parse artifact");
                return false;
            }
        };

        if let Err(e) = tokio::fs::create_dir_all(&self.root).await {
            warn!(path = %self.root.display(), error = %e, "Failed to create artifact directory");
            return false;
        }

        // The full body lands in a temp file first; linking it into place
        // fails if the artifact already exists, so a partial write can never
        // occupy the final path.
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", storage_key(&doc.id), Uuid::new_v4()));
        if let Err(e) = tokio::fs::write(&tmp, &body).await {
            warn!(path = %tmp.display(), error = %e, "Failed to write parse artifact");
            let _ = tokio::fs::remove_file(&tmp).await;
            return false;
        }

        let linked = tokio::fs::hard_link(&tmp, &path).await;
        let _ = tokio::fs::remove_file(&tmp).await;
        match linked {
            Ok(()) => {
                debug!(doc_id = %doc.id, path = %path.display(), "Parse artifact written");
                true
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!(doc_id = %doc.id, "Parse artifact already present, keeping first copy");
                false
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to publish parse artifact");
                false
            }
        }
    }
}
