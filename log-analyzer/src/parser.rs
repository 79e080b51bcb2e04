use std::{num::NonZero, sync::LazyLock};

use chrono::{DateTime, Timelike as _};
use lru::LruCache;
use parking_lot::Mutex;
use regex::Regex;
use tracing::debug;

use crate::{
    classifier::{Classification, UserAgentClassifier},
    error::ParseError,
    models::LogRecord,
    sniffer::{UserAgentSniffer, WootheeSniffer},
};

// 203.0.113.5 - - [01/Aug/2025:10:00:01 +0000] "GET /index.html HTTP/1.1" 200 1024 "http://example.com/" "Mozilla/5.0 ..."
static LOG_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"^(\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}) - - "#,
        r#"\[(\d{2}/\w{3}/\d{4}:\d{2}:\d{2}:\d{2} [+-]\d{4})\] "#,
        r#""(GET|POST|PUT|DELETE|HEAD)\s(.+?)\sHTTP/\d\.\d" "#,
        r#"(\d{3}) "#,
        r#"(\d+|-) "#,
        r#""(.*?)" "#,
        r#""(.*?)""#,
    ))
    .expect("static regex")
});

const TS_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

pub const DEFAULT_UA_CACHE_SIZE: NonZero<usize> = NonZero::new(4096).expect("nonzero const");

#[derive(Debug)]
pub struct ParseOutcome {
    pub records: Vec<LogRecord>,
    pub total_lines: usize,
}

impl ParseOutcome {
    pub fn skipped_lines(&self) -> usize {
        self.total_lines - self.records.len()
    }
}

/// Turns access-log lines into classified records.
///
/// Classification is memoised per user-agent string, so a parser kept across
/// uploads gets faster as it sees the same crawlers again.
pub struct LineParser<S = WootheeSniffer> {
    classifier: UserAgentClassifier<S>,
    agents: Mutex<LruCache<String, Classification>>,
}

impl Default for LineParser {
    fn default() -> Self {
        Self::new(UserAgentClassifier::default(), DEFAULT_UA_CACHE_SIZE)
    }
}

impl<S: UserAgentSniffer> LineParser<S> {
    pub fn new(classifier: UserAgentClassifier<S>, cache_size: NonZero<usize>) -> Self {
        Self {
            classifier,
            agents: Mutex::new(LruCache::new(cache_size)),
        }
    }

    pub fn parse(&self, line: &str) -> Result<LogRecord, ParseError> {
        let caps = LOG_PATTERN.captures(line.trim()).ok_or(ParseError::Grammar)?;
        // Every group is mandatory in the pattern.
        let field = |i: usize| caps.get(i).map_or("", |m| m.as_str());

        let timestamp = DateTime::parse_from_str(field(2), TS_FORMAT)?;
        let method = field(3).parse().map_err(|_| ParseError::Grammar)?;
        let status_code = field(5).parse().map_err(ParseError::StatusCode)?;
        let bytes_sent = match field(6) {
            "-" => 0,
            digits => digits.parse().map_err(ParseError::BytesSent)?,
        };
        let user_agent = field(8);
        let Classification { is_bot, bot_name } = self.classify(user_agent);

        Ok(LogRecord {
            timestamp,
            ip_address: field(1).to_owned(),
            method,
            path: field(4).to_owned(),
            status_code,
            bytes_sent,
            referrer: field(7).to_owned(),
            user_agent: user_agent.to_owned(),
            is_bot,
            bot_name,
            date: timestamp.date_naive(),
            hour: timestamp.hour(),
        })
    }

    pub fn parse_all<I>(&self, lines: I) -> ParseOutcome
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: ExactSizeIterator,
    {
        self.parse_all_with_progress(lines, |_, _| {})
    }

    /// `on_progress(processed, total)` runs after every line. It is advisory
    /// and has no say in what gets parsed.
    pub fn parse_all_with_progress<I, F>(&self, lines: I, mut on_progress: F) -> ParseOutcome
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: ExactSizeIterator,
        F: FnMut(usize, usize),
    {
        let lines = lines.into_iter();
        let total_lines = lines.len();
        let mut records = Vec::with_capacity(total_lines);
        for (i, line) in lines.enumerate() {
            match self.parse(line.as_ref()) {
                Ok(record) => records.push(record),
                Err(e) => debug!(line = i + 1, error = %e, "skipping malformed line"),
            }
            on_progress(i + 1, total_lines);
        }
        ParseOutcome {
            records,
            total_lines,
        }
    }

    fn classify(&self, user_agent: &str) -> Classification {
        let mut agents = self.agents.lock();
        if let Some(hit) = agents.get(user_agent) {
            return hit.clone();
        }
        let verdict = self.classifier.classify(user_agent);
        agents.put(user_agent.to_owned(), verdict.clone());
        verdict
    }
}
