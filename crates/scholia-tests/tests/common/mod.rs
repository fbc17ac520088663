#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use scholia_citations::{
    CitationGraphFetcher, RequestFailure, RetryPolicy, ScholarTransport, SemanticScholarClient, Sleeper,
};
pub use scholia_agent::testing::{tool_call, ScriptedModel};

pub const PAPER: &str = "\
Efficient Retrieval for Long Scientific Documents Using Overlapping Windows and Cosine Ranking
Alice Smith, Bob Jones, Carol White
Department of Computer Science, Example University

Abstract
We present a retrieval technique for long scientific documents
that splits text into overlapping windows and ranks them by
cosine similarity to the question.

1. Introduction
Long documents are hard to search.
Prior work uses keyword matching.
2. Method
We embed overlapping chunks with a sliding window of one thousand characters.
3. Results
Recall improves substantially on the benchmark.

References
[1] Smith, A. Retrieval at scale. 2020.
[2] Jones, B. Windows and overlaps. 2021.
";

pub const PAPER_TITLE: &str =
    "Efficient Retrieval for Long Scientific Documents Using Overlapping Windows and Cosine Ranking";

// ---------------------------------------------------------------------------
// Scripted bibliographic transport
// ---------------------------------------------------------------------------

type Reply = std::result::Result<Value, RequestFailure>;

/// Per-path queues of responses. Unscripted searches find nothing; other
/// unscripted paths answer 404.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn push(&self, path: &str, reply: Reply) -> &Self {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> usize {
        self.calls().iter().filter(|p| p.as_str() == path).count()
    }
}

#[async_trait]
impl ScholarTransport for ScriptedTransport {
    async fn get_json(&self, path: &str, _params: &[(&str, String)]) -> Reply {
        self.calls.lock().unwrap().push(path.to_string());
        let scripted = self
            .replies
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(|queue| queue.pop_front());
        match scripted {
            Some(reply) => reply,
            None if path == "/paper/search" => Ok(json!({"total": 0, "data": []})),
            None => Err(RequestFailure::Status(404)),
        }
    }
}

#[derive(Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

pub fn fetcher(transport: Arc<ScriptedTransport>, sleeper: Arc<RecordingSleeper>) -> CitationGraphFetcher {
    CitationGraphFetcher::new(SemanticScholarClient::new(
        transport,
        RetryPolicy::new(3, Duration::from_secs(5)),
        sleeper,
    ))
}

pub fn search_hit(paper_id: &str, title: &str) -> Reply {
    Ok(json!({"total": 1, "data": [{"paperId": paper_id, "title": title}]}))
}
