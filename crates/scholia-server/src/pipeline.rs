//! Upload analysis: parse → insights → citation graph → vector index.

use tracing::{info, instrument, warn};

use scholia_core::api_types::{DocumentRecord, ProcessingStatus};
use scholia_core::document::ParsedDataSummary;
use scholia_core::error::{Result, ScholiaError};

use crate::state::AppState;

/// Runs the full analysis for a newly uploaded file.
///
/// Insights are the only hard step; citations and indexing degrade to
/// not-found and `index_ready = false`. Derived fields are written to the
/// record in one update after the hard step succeeded, so a failed analysis
/// leaves only the status change behind.
#[instrument(skip(state, bytes), fields(bytes = bytes.len()))]
pub async fn analyze_upload(
    state: &AppState,
    doc_id: &str,
    filename: &str,
    bytes: &[u8],
) -> Result<(DocumentRecord, ParsedDataSummary)> {
    let mut record = DocumentRecord::uploaded(doc_id, filename);
    record.status = ProcessingStatus::Processing;
    state.records.insert(record).await;

    let document = state.parser.parse(doc_id, filename, bytes).await;
    let parsed = document.summary_counts();
    info!(
        title = %document.title,
        sections = parsed.sections_count,
        references = parsed.references_count,
        placeholder = document.is_placeholder(),
        "Document parsed"
    );

    let insights = match state.analyzer.analyze(&document).await {
        Ok(insights) => insights,
        Err(e) => {
            state
                .records
                .update(doc_id, |r| r.status = ProcessingStatus::Failed)
                .await;
            return Err(match e {
                ScholiaError::Analysis(_) => e,
                other => ScholiaError::Analysis(other.to_string()),
            });
        }
    };

    let citations = state.citations.resolve(&document.title).await;

    let index_ready = match state.retrieval_engine() {
        Ok(engine) => engine.setup(&document.full_text, doc_id).await,
        Err(e) => {
            warn!(error = %e, "Retrieval engine unavailable, skipping index build");
            false
        }
    };

    let updated = state
        .records
        .update(doc_id, |r| {
            r.title = Some(document.title.clone());
            r.authors = Some(document.authors.clone());
            r.abstract_text = Some(document.abstract_text.clone());
            r.insights = Some(insights);
            r.source_id = citations.source_id.clone();
            r.related_papers_json = Some(citations.references_json.clone());
            r.index_ready = index_ready;
            r.status = ProcessingStatus::Completed;
        })
        .await
        .ok_or_else(|| ScholiaError::Internal(format!("record {doc_id} vanished during analysis")))?;

    info!(index_ready, citations_found = !citations.is_not_found(), "Analysis completed");
    Ok((updated, parsed))
}
