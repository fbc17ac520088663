mod common;

use std::sync::Arc;

use common::{PAPER, PAPER_TITLE};
use scholia_core::config::ChunkingConfig;
use scholia_core::parser::DocumentParser;
use scholia_index::{FsIndexStore, HashEmbedder, IndexStore, RetrievalEngine, TextChunker};
use scholia_parser::HeuristicParser;

fn engine(store: Arc<FsIndexStore>, size: usize, overlap: usize) -> RetrievalEngine {
    RetrievalEngine::new(
        Arc::new(HashEmbedder::default()),
        store,
        TextChunker::new(ChunkingConfig {
            chunk_size: size,
            chunk_overlap: overlap,
        })
        .expect("valid chunking config"),
    )
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_upload_is_titled_by_filename() {
    let doc = HeuristicParser::new().parse("doc-0", "empty.pdf", b"").await;
    assert_eq!(doc.title, "empty.pdf");
    assert!(doc.is_placeholder());
}

#[tokio::test]
async fn text_upload_recovers_abstract_within_bounds() {
    let doc = HeuristicParser::new()
        .parse("doc-1", "paper.txt", PAPER.as_bytes())
        .await;

    assert_eq!(doc.title, PAPER_TITLE);
    let len = doc.abstract_text.chars().count();
    assert!((50..2000).contains(&len), "abstract length {len}");
    assert!(!doc.abstract_text.to_lowercase().contains("introduction"));
    assert_eq!(doc.references.len(), 2);
    assert!(!doc.key_sections().methodology.is_empty());
}

// ---------------------------------------------------------------------------
// Index build, reload and retrieval
// ---------------------------------------------------------------------------

#[tokio::test]
async fn setup_then_load_then_retrieve() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FsIndexStore::new(dir.path()));

    assert!(engine(store.clone(), 120, 30).setup(PAPER, "doc-1").await);

    let reader = engine(store.clone(), 120, 30);
    assert!(reader.load("doc-1").await);
    assert_eq!(reader.loaded_doc_id().await.as_deref(), Some("doc-1"));

    let hits = reader.retrieve("sliding window overlapping chunks", 3).await;
    assert!(!hits.is_empty());
    assert!(hits.len() <= 3);
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[tokio::test]
async fn rebuild_leaves_single_index() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(FsIndexStore::new(dir.path()));
    let engine = engine(store.clone(), 200, 50);

    assert!(engine.setup(PAPER, "doc-1").await);
    assert!(engine.setup("A completely different text about protein folding.", "doc-1").await);

    let files: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read index dir")
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["doc-doc-1.json".to_string()]);

    let index = store.load("doc-1").await.expect("load").expect("index present");
    assert_eq!(index.len(), 1);
    assert!(index.entries[0].chunk.text.contains("protein folding"));
}

#[tokio::test]
async fn missing_index_is_unavailable() {
    let dir = tempfile::tempdir().expect("tempdir");
    let reader = engine(Arc::new(FsIndexStore::new(dir.path())), 100, 10);
    assert!(!reader.load("never-built").await);
    assert!(reader.retrieve("anything", 3).await.is_empty());
}
