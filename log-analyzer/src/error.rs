use std::{io, num::ParseIntError, string::FromUtf8Error};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("input is not a valid gzip stream")]
    Gzip(#[source] io::Error),

    #[error("input is not valid UTF-8 text")]
    Encoding(#[from] FromUtf8Error),
}

/// Why a single line produced no record. Never escalated past the parse loop.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("line does not match the combined log format")]
    Grammar,

    #[error("invalid timestamp")]
    Timestamp(#[from] chrono::ParseError),

    #[error("invalid status code")]
    StatusCode(#[source] ParseIntError),

    #[error("invalid byte count")]
    BytesSent(#[source] ParseIntError),
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to decode log file")]
    Decode(#[from] DecodeError),

    #[error("no valid log entries found in {total_lines} lines")]
    Empty { total_lines: usize },
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("no data matches the selected filters")]
    NoMatches,
}
