use std::{collections::BTreeSet, fmt, str::FromStr};

use chrono::NaiveDate;

use crate::models::LogRecord;

/// Either every value or exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Choice<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Choice<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == value,
        }
    }
}

/// `all` (any case) or a value.
impl<T: FromStr> FromStr for Choice<T> {
    type Err = T::Err;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

impl<T: fmt::Display> fmt::Display for Choice<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Only(v) => v.fmt(f),
        }
    }
}

/// Missing date bounds mean the record set's own first/last day.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub bot_name: Choice<String>,
    pub status_code: Choice<u16>,
}

impl FilterCriteria {
    pub fn matches(&self, record: &LogRecord) -> bool {
        self.start_date.is_none_or(|start| record.date >= start)
            && self.end_date.is_none_or(|end| record.date <= end)
            && self.bot_name.admits(&record.bot_name)
            && self.status_code.admits(&record.status_code)
    }
}

/// Everything one ingest pass produced, in line order.
#[derive(Debug, Clone)]
pub struct RecordSet {
    records: Vec<LogRecord>,
    total_lines: usize,
}

impl RecordSet {
    pub fn new(records: Vec<LogRecord>, total_lines: usize) -> Self {
        Self {
            records,
            total_lines,
        }
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn skipped_lines(&self) -> usize {
        self.total_lines - self.records.len()
    }

    pub fn apply(&self, criteria: &FilterCriteria) -> Vec<&LogRecord> {
        self.records.iter().filter(|r| criteria.matches(r)).collect()
    }

    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.iter().map(|r| r.date).min()?;
        let last = self.records.iter().map(|r| r.date).max()?;
        Some((first, last))
    }

    pub fn bot_names(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r.bot_name.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn status_codes(&self) -> Vec<u16> {
        self.records
            .iter()
            .map(|r| r.status_code)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
