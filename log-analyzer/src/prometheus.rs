use prometheus::{IntGauge, IntGaugeVec, Opts, Registry, opts};

use crate::{analytics::Analytics, store::RecordSet};

const TOP_PATH_LABELS: usize = 5;

pub struct PromMetrics {
    pub total_requests: IntGauge,
    pub bot_requests: IntGauge,
    pub unique_ips: IntGauge,
    pub skipped_lines: IntGauge,
    pub bot_hits: IntGaugeVec,
    pub status_hits: IntGaugeVec,
    pub path_hits: IntGaugeVec,
    pub registry: Registry,
}

impl PromMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let total_requests = IntGauge::with_opts(Opts::new(
            "log_total_requests",
            "Requests in the loaded log file",
        ))?;
        let bot_requests = IntGauge::with_opts(Opts::new(
            "log_bot_requests",
            "Requests classified as bots",
        ))?;
        let unique_ips = IntGauge::with_opts(Opts::new("log_unique_ips", "Distinct client IPs"))?;
        let skipped_lines = IntGauge::with_opts(Opts::new(
            "log_skipped_lines",
            "Lines that did not parse",
        ))?;
        let bot_hits = IntGaugeVec::new(opts!("log_bot_hits", "Requests per bot"), &["bot"])?;
        let status_hits = IntGaugeVec::new(
            opts!("log_status_hits", "Requests per status code"),
            &["status", "class"],
        )?;
        let path_hits = IntGaugeVec::new(
            opts!("log_path_hits", "Requests for the most requested paths"),
            &["path"],
        )?;

        registry.register(Box::new(total_requests.clone()))?;
        registry.register(Box::new(bot_requests.clone()))?;
        registry.register(Box::new(unique_ips.clone()))?;
        registry.register(Box::new(skipped_lines.clone()))?;
        registry.register(Box::new(bot_hits.clone()))?;
        registry.register(Box::new(status_hits.clone()))?;
        registry.register(Box::new(path_hits.clone()))?;

        Ok(Self {
            total_requests,
            bot_requests,
            unique_ips,
            skipped_lines,
            bot_hits,
            status_hits,
            path_hits,
            registry,
        })
    }

    /// Overwrites every gauge with the views of `records`; labels of a
    /// previous file disappear.
    pub fn export(&self, records: &RecordSet) {
        let analytics = Analytics::from_records(records.records());
        let summary = analytics.summary();
        self.total_requests.set(summary.total_requests as i64);
        self.bot_requests.set(summary.bot_requests as i64);
        self.unique_ips.set(summary.unique_ips as i64);
        self.skipped_lines.set(records.skipped_lines() as i64);

        self.bot_hits.reset();
        for (bot, count) in analytics.bot_distribution() {
            self.bot_hits.with_label_values(&[&bot]).set(count as i64);
        }

        self.status_hits.reset();
        for status in analytics.status_distribution() {
            self.status_hits
                .with_label_values(&[&status.status_code.to_string(), &status.class.to_string()])
                .set(status.count as i64);
        }

        self.path_hits.reset();
        for (path, count) in analytics.top_paths(TOP_PATH_LABELS) {
            self.path_hits.with_label_values(&[&path]).set(count as i64);
        }
    }
}
