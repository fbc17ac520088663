pub mod client;
pub mod machine;
pub mod retry;

pub use client::{HttpScholarTransport, ScholarTransport, SemanticScholarClient};
pub use machine::{transition, CitationGraphFetcher, FetchState, StepOutcome, TRANSITIONS};
pub use retry::{RequestFailure, RetryPolicy, Sleeper, TokioSleeper};
