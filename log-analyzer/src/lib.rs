//! Access-log analysis for SEO: parse combined-format logs, tell crawlers
//! from people, and aggregate the result under date/bot/status filters.

pub mod analytics;
pub mod classifier;
pub mod decoder;
pub mod error;
pub mod models;
pub mod parser;
pub mod prometheus;
pub mod server;
pub mod session;
pub mod sniffer;
pub mod store;

use analytics::QueryResult;
use decoder::{Framing, decode_lines};
use error::{IngestError, QueryError};
use parser::LineParser;
use sniffer::UserAgentSniffer;
use store::{FilterCriteria, RecordSet};
use tracing::info;

/// Decodes and parses a whole log file with a fresh parser.
pub fn ingest(bytes: &[u8], framing: Framing) -> Result<RecordSet, IngestError> {
    ingest_with(&LineParser::default(), bytes, framing, |_, _| {})
}

/// Like [`ingest`] but reuses `parser` and reports `(processed, total)` lines
/// as it goes.
pub fn ingest_with<S, F>(
    parser: &LineParser<S>,
    bytes: &[u8],
    framing: Framing,
    on_progress: F,
) -> Result<RecordSet, IngestError>
where
    S: UserAgentSniffer,
    F: FnMut(usize, usize),
{
    let lines = decode_lines(bytes, framing)?;
    let outcome = parser.parse_all_with_progress(lines, on_progress);
    if outcome.records.is_empty() {
        return Err(IngestError::Empty {
            total_lines: outcome.total_lines,
        });
    }
    info!(
        records = outcome.records.len(),
        skipped = outcome.skipped_lines(),
        "ingested log file"
    );
    Ok(RecordSet::new(outcome.records, outcome.total_lines))
}

pub fn query<'a>(
    records: &'a RecordSet,
    criteria: &FilterCriteria,
) -> Result<QueryResult<'a>, QueryError> {
    let matched = records.apply(criteria);
    if matched.is_empty() {
        return Err(QueryError::NoMatches);
    }
    Ok(QueryResult::compute(matched))
}
