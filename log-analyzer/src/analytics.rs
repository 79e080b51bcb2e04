use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{LogRecord, StatusClass};

pub const TOP_PATHS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total_requests: usize,
    pub bot_requests: usize,
    pub unique_ips: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status_code: u16,
    pub class: StatusClass,
    pub count: usize,
}

/// Tallies over one record subset. Built in a single pass and never updated,
/// a new subset gets a new `Analytics`.
#[derive(Debug, Default)]
pub struct Analytics<'a> {
    total: usize,
    bot_hits: usize,
    ips: HashSet<&'a str>,
    // first-seen order is kept by the Vec, the map only indexes into it
    bots: Vec<(&'a str, usize)>,
    bot_index: HashMap<&'a str, usize>,
    statuses: BTreeMap<u16, usize>,
    paths: HashMap<&'a str, (usize, usize)>,
    days: BTreeMap<NaiveDate, usize>,
    hours: [usize; 24],
}

impl<'a> Analytics<'a> {
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a LogRecord>,
    {
        let mut analytics = Self::default();
        for record in records {
            analytics.record(record);
        }
        analytics
    }

    fn record(&mut self, record: &'a LogRecord) {
        self.total += 1;
        if record.is_bot {
            self.bot_hits += 1;
        }
        self.ips.insert(record.ip_address.as_str());

        let next = self.bots.len();
        let slot = *self.bot_index.entry(record.bot_name.as_str()).or_insert(next);
        if slot == next {
            self.bots.push((record.bot_name.as_str(), 0));
        }
        self.bots[slot].1 += 1;

        *self.statuses.entry(record.status_code).or_default() += 1;

        let seen = self.paths.len();
        self.paths.entry(record.path.as_str()).or_insert((seen, 0)).1 += 1;

        *self.days.entry(record.date).or_default() += 1;
        if let Some(slot) = self.hours.get_mut(record.hour as usize) {
            *slot += 1;
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            total_requests: self.total,
            bot_requests: self.bot_hits,
            unique_ips: self.ips.len(),
        }
    }

    /// Count descending, ties in first-seen order.
    pub fn bot_distribution(&self) -> Vec<(String, usize)> {
        let mut entries: Vec<_> = self
            .bots
            .iter()
            .map(|(name, count)| (name.to_string(), *count))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }

    pub fn status_distribution(&self) -> Vec<StatusCount> {
        self.statuses
            .iter()
            .map(|(code, count)| StatusCount {
                status_code: *code,
                class: StatusClass::of(*code),
                count: *count,
            })
            .collect()
    }

    /// At most `n` paths, count descending, ties in first-seen order.
    pub fn top_paths(&self, n: usize) -> Vec<(String, usize)> {
        let mut entries: Vec<_> = self.paths.iter().collect();
        entries.sort_unstable_by_key(|(_, (seen, count))| (std::cmp::Reverse(*count), *seen));
        entries
            .into_iter()
            .take(n)
            .map(|(path, (_, count))| (path.to_string(), *count))
            .collect()
    }

    pub fn daily_series(&self) -> Vec<(NaiveDate, usize)> {
        self.days.iter().map(|(day, count)| (*day, *count)).collect()
    }

    pub fn hourly(&self) -> [usize; 24] {
        self.hours
    }
}

#[derive(Debug, Serialize)]
pub struct QueryResult<'a> {
    pub summary: Summary,
    pub bot_distribution: Vec<(String, usize)>,
    pub status_distribution: Vec<StatusCount>,
    pub top_paths: Vec<(String, usize)>,
    pub daily_series: Vec<(NaiveDate, usize)>,
    pub hourly: [usize; 24],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub matched_records: Vec<&'a LogRecord>,
}

impl<'a> QueryResult<'a> {
    pub fn compute(matched_records: Vec<&'a LogRecord>) -> Self {
        let analytics = Analytics::from_records(matched_records.iter().copied());
        Self {
            summary: analytics.summary(),
            bot_distribution: analytics.bot_distribution(),
            status_distribution: analytics.status_distribution(),
            top_paths: analytics.top_paths(TOP_PATHS),
            daily_series: analytics.daily_series(),
            hourly: analytics.hourly(),
            matched_records,
        }
    }

    /// Drops the records, keeping only the views.
    pub fn without_records(mut self) -> Self {
        self.matched_records = Vec::new();
        self
    }
}
