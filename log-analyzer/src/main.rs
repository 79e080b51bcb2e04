use std::{error::Error, num::NonZero, path::PathBuf, sync::Arc};

use clap::Parser;
use num_format::{Locale, ToFormattedString};
use seo_log_analyzer::{
    classifier::UserAgentClassifier,
    decoder::Framing,
    ingest_with,
    parser::{DEFAULT_UA_CACHE_SIZE, LineParser},
    prometheus::PromMetrics,
    server::{self, AppState},
    session::Session,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const BYTES_PER_MB: usize = 1024 * 1024;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Log file to load before accepting uploads; `.gz` files are decompressed
    #[arg(long)]
    preload: Option<PathBuf>,

    #[arg(long, default_value_t = 256)]
    max_upload_mb: usize,

    /// Distinct user agents whose classification is remembered
    #[arg(long, default_value_t = DEFAULT_UA_CACHE_SIZE)]
    ua_cache_size: NonZero<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let parser = Arc::new(LineParser::new(
        UserAgentClassifier::default(),
        args.ua_cache_size,
    ));
    let session = Arc::new(Session::default());

    if let Some(path) = &args.preload {
        let bytes = tokio::fs::read(path).await?;
        let records = ingest_with(&*parser, &bytes, Framing::from_filename(path), |_, _| {})?;
        info!(
            path = %path.display(),
            "preloaded {} log entries",
            records.len().to_formatted_string(&Locale::en)
        );
        session.replace(records);
    }

    let state = AppState {
        session,
        parser,
        metrics: Arc::new(PromMetrics::new()?),
    };
    server::serve(state, args.port, max_upload_bytes(args.max_upload_mb)).await?;
    Ok(())
}

fn max_upload_bytes(megabytes: usize) -> usize {
    megabytes.saturating_mul(BYTES_PER_MB)
}
