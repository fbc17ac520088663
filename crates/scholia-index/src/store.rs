use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use scholia_core::error::{Result, ScholiaError};
use scholia_core::storage::storage_key;

use crate::index::VectorIndex;

/// Persistence for per-document vector indexes, addressed by document id.
/// Saving replaces whatever was stored at that id.
#[async_trait]
pub trait IndexStore: Send + Sync {
    async fn save(&self, index: &VectorIndex) -> Result<()>;
    async fn load(&self, doc_id: &str) -> Result<Option<VectorIndex>>;
    async fn exists(&self, doc_id: &str) -> bool;
}

/// One JSON file per document under `root`.
///
/// Writes go to a uniquely named temp file which is then renamed over the
/// target, so readers only ever see a complete index.
#[derive(Debug, Clone)]
pub struct FsIndexStore {
    root: PathBuf,
}

impl FsIndexStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, doc_id: &str) -> PathBuf {
        self.root.join(format!("{}.json", storage_key(doc_id)))
    }
}

#[async_trait]
impl IndexStore for FsIndexStore {
    async fn save(&self, index: &VectorIndex) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        let path = self.path_for(&index.doc_id);
        let tmp = self
            .root
            .join(format!(".{}.{}.tmp", storage_key(&index.doc_id), Uuid::new_v4()));
        let body = serde_json::to_vec(index)?;

        tokio::fs::write(&tmp, &body).await.map_err(|e| {
            ScholiaError::Index(format!("Failed to write {}: {e}", tmp.display()))
        })?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(ScholiaError::Index(format!(
                "Failed to finalize index write to {}: {e}",
                path.display()
            )));
        }

        tracing::debug!(
            doc_id = %index.doc_id,
            entries = index.len(),
            path = %path.display(),
            "Vector index persisted"
        );
        Ok(())
    }

    async fn load(&self, doc_id: &str) -> Result<Option<VectorIndex>> {
        let path = self.path_for(doc_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let index: VectorIndex = serde_json::from_slice(&bytes).map_err(|e| {
            ScholiaError::Index(format!("Failed to decode {}: {e}", path.display()))
        })?;
        if index.doc_id != doc_id {
            tracing::warn!(
                requested = doc_id,
                stored = %index.doc_id,
                path = %path.display(),
                "Index file belongs to another document, ignoring"
            );
            return Ok(None);
        }
        Ok(Some(index))
    }

    async fn exists(&self, doc_id: &str) -> bool {
        matches!(self.load(doc_id).await, Ok(Some(_)))
    }
}

/// Process-local store for tests and ephemeral setups.
#[derive(Debug, Default)]
pub struct MemoryIndexStore {
    indexes: RwLock<HashMap<String, VectorIndex>>,
}

impl MemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.indexes.read().await.len()
    }
}

#[async_trait]
impl IndexStore for MemoryIndexStore {
    async fn save(&self, index: &VectorIndex) -> Result<()> {
        self.indexes
            .write()
            .await
            .insert(index.doc_id.clone(), index.clone());
        Ok(())
    }

    async fn load(&self, doc_id: &str) -> Result<Option<VectorIndex>> {
        Ok(self.indexes.read().await.get(doc_id).cloned())
    }

    async fn exists(&self, doc_id: &str) -> bool {
        self.indexes.read().await.contains_key(doc_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunker::Chunk;
    use crate::index::IndexEntry;

    fn sample(doc_id: &str, text: &str) -> VectorIndex {
        VectorIndex::new(
            doc_id,
            "test",
            vec![IndexEntry {
                chunk: Chunk {
                    index: 0,
                    text: text.into(),
                    start: 0,
                    end: text.chars().count(),
                },
                vector: vec![1.0, 0.0],
            }],
        )
    }

    #[tokio::test]
    async fn fs_round_trip_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsIndexStore::new(dir.path());

        assert!(!store.exists("doc-1").await);
        assert!(store.load("doc-1").await.unwrap().is_none());

        store.save(&sample("doc-1", "first")).await.unwrap();
        store.save(&sample("doc-1", "second")).await.unwrap();

        let loaded = store.load("doc-1").await.unwrap().unwrap();
        assert_eq!(loaded.entries[0].chunk.text, "second");

        let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1, "no temp files or duplicates left behind");
    }

    #[tokio::test]
    async fn similar_ids_keep_separate_indexes() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsIndexStore::new(dir.path());

        store.save(&sample("paper.v1", "first paper")).await.unwrap();
        assert!(!store.exists("paper_v1").await);
        assert!(store.load("paper_v1").await.unwrap().is_none());

        store.save(&sample("paper_v1", "second paper")).await.unwrap();
        let first = store.load("paper.v1").await.unwrap().unwrap();
        assert_eq!(first.doc_id, "paper.v1");
        assert_eq!(first.entries[0].chunk.text, "first paper");
        let second = store.load("paper_v1").await.unwrap().unwrap();
        assert_eq!(second.entries[0].chunk.text, "second paper");
    }

    #[tokio::test]
    async fn file_for_another_id_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsIndexStore::new(dir.path());
        store.save(&sample("doc-2", "other")).await.unwrap();
        std::fs::rename(store.path_for("doc-2"), store.path_for("doc-1")).unwrap();

        assert!(store.load("doc-1").await.unwrap().is_none());
        assert!(!store.exists("doc-1").await);
    }

    #[tokio::test]
    async fn corrupt_file_is_an_index_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsIndexStore::new(dir.path());
        std::fs::write(store.path_for("doc-1"), b"{not json").unwrap();
        assert!(matches!(
            store.load("doc-1").await,
            Err(ScholiaError::Index(_))
        ));
    }

    #[tokio::test]
    async fn memory_store_keeps_one_per_id() {
        let store = MemoryIndexStore::new();
        store.save(&sample("doc-1", "a")).await.unwrap();
        store.save(&sample("doc-1", "b")).await.unwrap();
        assert_eq!(store.len().await, 1);
        assert!(store.exists("doc-1").await);
    }
}
