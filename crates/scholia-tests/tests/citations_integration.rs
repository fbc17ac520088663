mod common;

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use common::{fetcher, search_hit, RecordingSleeper, ScriptedTransport};
use scholia_citations::{FetchState, RequestFailure};
use scholia_core::citation::CITATIONS_NOT_FOUND;

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn resolved_title_compiles_graph() {
    let transport = Arc::new(ScriptedTransport::default());
    transport
        .push("/paper/search", search_hit("p1", "Attention Is All You Need"))
        .push(
            "/paper/p1/references",
            Ok(json!({"data": [
                {"citedPaper": {"paperId": "r1", "title": "Neural Machine Translation"}},
                {"citedPaper": null},
                {"citedPaper": {"paperId": "r2", "title": "Sequence to Sequence Learning"}}
            ]})),
        )
        .push(
            "/paper/p1/citations",
            Ok(json!({"data": [{"citingPaper": {"paperId": "c1", "title": "BERT"}}]})),
        );
    let sleeper = Arc::new(RecordingSleeper::default());

    let (result, path) = fetcher(transport.clone(), sleeper.clone())
        .resolve_traced("Attention Is All You Need")
        .await;

    assert_eq!(
        path,
        vec![FetchState::Search, FetchState::Fetch, FetchState::Compile, FetchState::Done]
    );
    assert_eq!(result.source_id.as_deref(), Some("p1"));
    let graph = result.graph().expect("compiled graph should decode");
    assert_eq!(graph.references.len(), 2);
    assert_eq!(graph.citations.len(), 1);
    assert_eq!(graph.citations[0]["title"], "BERT");
    assert!(sleeper.delays().is_empty());
}

// ---------------------------------------------------------------------------
// Not found
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_title_reaches_not_found() {
    let transport = Arc::new(ScriptedTransport::default());
    let sleeper = Arc::new(RecordingSleeper::default());

    let (result, path) = fetcher(transport.clone(), sleeper)
        .resolve_traced("zzz-nonexistent-title-12345")
        .await;

    assert_eq!(path, vec![FetchState::Search, FetchState::NotFound, FetchState::Done]);
    assert_eq!(result.references_json, CITATIONS_NOT_FOUND);
    assert!(result.source_id.is_none());
    assert_eq!(transport.calls(), vec!["/paper/search".to_string()]);
}

#[tokio::test]
async fn blank_title_skips_the_service() {
    let transport = Arc::new(ScriptedTransport::default());
    let result = fetcher(transport.clone(), Arc::new(RecordingSleeper::default()))
        .resolve("   ")
        .await;
    assert!(result.is_not_found());
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn search_server_error_is_not_found() {
    let transport = Arc::new(ScriptedTransport::default());
    transport.push("/paper/search", Err(RequestFailure::Status(500)));
    let sleeper = Arc::new(RecordingSleeper::default());

    let result = fetcher(transport.clone(), sleeper.clone()).resolve("Some Paper").await;

    assert!(result.is_not_found());
    assert_eq!(transport.calls_to("/paper/search"), 1);
    assert!(sleeper.delays().is_empty());
}

// ---------------------------------------------------------------------------
// Rate limiting
// ---------------------------------------------------------------------------

#[tokio::test]
async fn rate_limited_search_retries_with_doubling_delay() {
    let transport = Arc::new(ScriptedTransport::default());
    transport
        .push("/paper/search", Err(RequestFailure::RateLimited))
        .push("/paper/search", Err(RequestFailure::RateLimited))
        .push("/paper/search", Err(RequestFailure::RateLimited))
        .push("/paper/search", search_hit("p1", "Late Success"));
    let sleeper = Arc::new(RecordingSleeper::default());

    let result = fetcher(transport.clone(), sleeper.clone()).resolve("Late Success").await;

    // Three attempts, all rate limited: the call gives up before the success.
    assert_eq!(transport.calls_to("/paper/search"), 3);
    assert!(result.is_not_found());
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_secs(5), Duration::from_secs(10)]
    );
}

#[tokio::test]
async fn rate_limit_then_success_resolves() {
    let transport = Arc::new(ScriptedTransport::default());
    transport
        .push("/paper/search", Err(RequestFailure::RateLimited))
        .push("/paper/search", search_hit("p9", "Recovered"))
        .push("/paper/p9/references", Ok(json!({"data": []})))
        .push("/paper/p9/citations", Ok(json!({"data": []})));
    let sleeper = Arc::new(RecordingSleeper::default());

    let result = fetcher(transport.clone(), sleeper.clone()).resolve("Recovered").await;

    assert_eq!(result.source_id.as_deref(), Some("p9"));
    assert_eq!(sleeper.delays(), vec![Duration::from_secs(5)]);
}

// ---------------------------------------------------------------------------
// Partial fetch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_side_is_empty_without_aborting() {
    let transport = Arc::new(ScriptedTransport::default());
    transport
        .push("/paper/search", search_hit("p1", "Half Known"))
        .push("/paper/p1/references", Err(RequestFailure::Status(500)))
        .push(
            "/paper/p1/citations",
            Ok(json!({"data": [{"citingPaper": {"paperId": "c1"}}]})),
        );

    let result = fetcher(transport.clone(), Arc::new(RecordingSleeper::default()))
        .resolve("Half Known")
        .await;

    let graph = result.graph().expect("graph should be compiled");
    assert!(graph.references.is_empty());
    assert_eq!(graph.citations.len(), 1);
    assert_eq!(transport.calls_to("/paper/p1/references"), 1);
}
