use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use derive_getters::Getters;

#[derive(Parser, Debug, Getters)]
#[command(name = "log-forge")]
#[command(about = "Generate synthetic combined-format access logs", long_about = None)]
pub struct CliArgs {
    /// Output file; a `.gz` suffix writes gzip
    #[arg(long, default_value = "access.log")]
    output: PathBuf,

    #[arg(long, default_value_t = 10_000)]
    lines: usize,

    /// Share of requests sent by crawlers, 0.0 to 1.0
    #[arg(long, default_value_t = 0.4, value_parser = parse_share)]
    bot_share: f64,

    /// Share of lines written truncated, 0.0 to 1.0
    #[arg(long, default_value_t = 0.0, value_parser = parse_share)]
    malformed_share: f64,

    #[arg(long, default_value_t = 7)]
    days: u32,

    #[arg(long, default_value = "2025-08-01")]
    start_date: NaiveDate,

    /// Seed for reproducible output; random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

/// A probability; NaN and values outside `0.0..=1.0` are rejected.
fn parse_share(s: &str) -> Result<f64, String> {
    let share: f64 = s.parse().map_err(|e| format!("{s}: {e}"))?;
    if (0.0..=1.0).contains(&share) {
        Ok(share)
    } else {
        Err(format!("{s} is not between 0.0 and 1.0"))
    }
}
