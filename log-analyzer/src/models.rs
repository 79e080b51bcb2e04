use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate};
use derive_more::Display;
use serde::Serialize;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[display("GET")]
    Get,
    #[display("POST")]
    Post,
    #[display("PUT")]
    Put,
    #[display("DELETE")]
    Delete,
    #[display("HEAD")]
    Head,
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            other => Err(format!("unsupported method {other}")),
        }
    }
}

/// One successfully parsed access-log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    pub timestamp: DateTime<FixedOffset>,
    pub ip_address: String,
    pub method: Method,
    pub path: String,
    pub status_code: u16,
    pub bytes_sent: u64,
    pub referrer: String,
    pub user_agent: String,
    pub is_bot: bool,
    pub bot_name: String,
    /// Calendar date of `timestamp` in its own offset.
    pub date: NaiveDate,
    pub hour: u32,
}

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusClass {
    #[display("1xx")]
    Informational,
    #[display("2xx")]
    Success,
    #[display("3xx")]
    Redirection,
    #[display("4xx")]
    ClientError,
    #[display("5xx")]
    ServerError,
    #[display("other")]
    Other,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            100..=199 => Self::Informational,
            200..=299 => Self::Success,
            300..=399 => Self::Redirection,
            400..=499 => Self::ClientError,
            500..=599 => Self::ServerError,
            _ => Self::Other,
        }
    }
}
