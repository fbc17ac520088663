//! Title → citation graph, as an explicit state machine.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};

use scholia_core::citation::CitationGraphResult;
use scholia_core::config::AppConfig;
use scholia_core::error::Result;

use crate::client::{HttpScholarTransport, ScholarTransport, SemanticScholarClient};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchState {
    Search,
    Fetch,
    Compile,
    NotFound,
    Done,
}

impl fmt::Display for FetchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FetchState::Search => "search",
            FetchState::Fetch => "fetch",
            FetchState::Compile => "compile",
            FetchState::NotFound => "not_found",
            FetchState::Done => "done",
        };
        f.write_str(name)
    }
}

/// What a state's step reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Resolved,
    Unresolved,
    Completed,
}

/// Every legal `(state, outcome) -> next` edge.
pub const TRANSITIONS: &[(FetchState, StepOutcome, FetchState)] = &[
    (FetchState::Search, StepOutcome::Resolved, FetchState::Fetch),
    (FetchState::Search, StepOutcome::Unresolved, FetchState::NotFound),
    (FetchState::Fetch, StepOutcome::Completed, FetchState::Compile),
    (FetchState::Compile, StepOutcome::Completed, FetchState::Done),
    (FetchState::NotFound, StepOutcome::Completed, FetchState::Done),
];

pub fn transition(state: FetchState, outcome: StepOutcome) -> Option<FetchState> {
    TRANSITIONS
        .iter()
        .find(|(from, on, _)| *from == state && *on == outcome)
        .map(|(_, _, to)| *to)
}

#[derive(Debug, Default)]
struct Run {
    source_id: Option<String>,
    references: Vec<Value>,
    citations: Vec<Value>,
    result: Option<CitationGraphResult>,
}

/// Resolves a paper title to its reference and citation lists.
///
/// Never fails: every failure path ends in [`CitationGraphResult::not_found`]
/// or in a graph with empty sides.
pub struct CitationGraphFetcher {
    client: SemanticScholarClient,
}

impl CitationGraphFetcher {
    pub fn new(client: SemanticScholarClient) -> Self {
        Self { client }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let transport: Arc<dyn ScholarTransport> = Arc::new(HttpScholarTransport::new(&config.s2_api_base)?);
        let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
        Ok(Self::new(SemanticScholarClient::new(
            transport,
            RetryPolicy::from_config(&config.retry),
            sleeper,
        )))
    }

    pub async fn resolve(&self, title: &str) -> CitationGraphResult {
        self.resolve_traced(title).await.0
    }

    /// Like [`resolve`](Self::resolve), also returning the states visited.
    #[instrument(skip(self))]
    pub async fn resolve_traced(&self, title: &str) -> (CitationGraphResult, Vec<FetchState>) {
        let mut run = Run::default();
        let mut state = FetchState::Search;
        let mut visited = vec![state];

        while state != FetchState::Done {
            let outcome = self.step(state, title, &mut run).await;
            let next = match transition(state, outcome) {
                Some(next) => next,
                None => {
                    error!(%state, ?outcome, "No transition defined, stopping");
                    break;
                }
            };
            debug!(from = %state, to = %next, "Citation fetch transition");
            state = next;
            visited.push(state);
        }

        let result = run.result.unwrap_or_else(CitationGraphResult::not_found);
        info!(
            found = !result.is_not_found(),
            source_id = result.source_id.as_deref().unwrap_or(""),
            "Citation fetch finished"
        );
        (result, visited)
    }

    async fn step(&self, state: FetchState, title: &str, run: &mut Run) -> StepOutcome {
        match state {
            FetchState::Search => {
                let title = title.trim();
                if title.is_empty() {
                    return StepOutcome::Unresolved;
                }
                run.source_id = self.client.search_paper_id(title).await;
                if run.source_id.is_some() {
                    StepOutcome::Resolved
                } else {
                    info!(title, "Paper not found by bibliographic search");
                    StepOutcome::Unresolved
                }
            }
            FetchState::Fetch => {
                if let Some(id) = run.source_id.as_deref() {
                    run.references = self.client.references(id).await;
                    run.citations = self.client.citations(id).await;
                }
                StepOutcome::Completed
            }
            FetchState::Compile => {
                let payload = json!({
                    "references": std::mem::take(&mut run.references),
                    "citations": std::mem::take(&mut run.citations),
                });
                run.result = Some(CitationGraphResult {
                    source_id: run.source_id.clone(),
                    references_json: payload.to_string(),
                });
                StepOutcome::Completed
            }
            FetchState::NotFound => {
                run.result = Some(CitationGraphResult::not_found());
                StepOutcome::Completed
            }
            FetchState::Done => StepOutcome::Completed,
        }
    }
}
