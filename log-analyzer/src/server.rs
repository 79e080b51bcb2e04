use std::{
    convert::Infallible,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderValue, Response, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use prometheus::TextEncoder;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info, warn};

use crate::{
    decoder::Framing,
    error::{IngestError, QueryError},
    ingest_with,
    parser::LineParser,
    prometheus::PromMetrics,
    query,
    session::Session,
    store::{Choice, FilterCriteria, RecordSet},
};

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Session>,
    pub parser: Arc<LineParser>,
    pub metrics: Arc<PromMetrics>,
}

pub async fn serve(state: AppState, port: u16, max_upload_bytes: usize) -> std::io::Result<()> {
    let addr = SocketAddr::new(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)), port);
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router(state, max_upload_bytes))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/up", get(up))
        .route("/upload", post(upload))
        .route("/options", get(options))
        .route("/query", get(query_views))
        .route("/records", get(records))
        .route("/metrics", get(metrics))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[derive(Debug)]
enum ApiError {
    NoFileLoaded,
    Ingest(IngestError),
    BadFilter(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response<Body> {
        let (status, message) = match self {
            Self::NoFileLoaded => (
                StatusCode::NOT_FOUND,
                "upload a log file to get started".to_owned(),
            ),
            Self::Ingest(e @ IngestError::Empty { .. }) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("{e}; make sure the file is in combined log format"),
            ),
            Self::Ingest(IngestError::Decode(e)) => (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()),
            Self::BadFilter(message) => (StatusCode::BAD_REQUEST, message),
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct UploadParams {
    name: Option<String>,
    gzip: Option<bool>,
}

impl UploadParams {
    fn framing(&self) -> Framing {
        match (self.gzip, &self.name) {
            (Some(flag), _) => Framing::from(flag),
            (None, Some(name)) => Framing::from_filename(name),
            (None, None) => Framing::Plain,
        }
    }
}

#[derive(Debug, Serialize)]
struct UploadSummary {
    records: usize,
    total_lines: usize,
    skipped_lines: usize,
}

#[derive(Debug, Deserialize)]
struct FilterParams {
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    bot: Option<String>,
    status: Option<String>,
}

impl FilterParams {
    fn criteria(self) -> Result<FilterCriteria, ApiError> {
        let bot_name = match self.bot {
            Some(bot) => bot
                .parse()
                .map_err(|_: Infallible| ApiError::BadFilter(format!("invalid bot name {bot}")))?,
            None => Choice::All,
        };
        let status_code = match self.status {
            Some(status) => status
                .parse()
                .map_err(|_| ApiError::BadFilter(format!("invalid status code {status}")))?,
            None => Choice::All,
        };
        Ok(FilterCriteria {
            start_date: self.start,
            end_date: self.end,
            bot_name,
            status_code,
        })
    }
}

async fn up() -> Response<Body> {
    ().into_response()
}

async fn upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<Json<UploadSummary>, ApiError> {
    let framing = params.framing();
    let parser = state.parser.clone();
    let parsed = tokio::task::spawn_blocking(move || {
        let mut reported = 0;
        ingest_with(&*parser, &body, framing, |done, total| {
            let decile = done * 10 / total;
            if decile > reported {
                reported = decile;
                debug!(done, total, "parsing log file");
            }
        })
    })
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    let records = match parsed {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, name = ?params.name, "rejected upload");
            return Err(ApiError::Ingest(e));
        }
    };
    let records = state.session.replace(records);
    info!(
        "Successfully loaded {} log entries",
        records.len().to_formatted_string(&Locale::en)
    );
    Ok(Json(UploadSummary {
        records: records.len(),
        total_lines: records.total_lines(),
        skipped_lines: records.skipped_lines(),
    }))
}

fn loaded(state: &AppState) -> Result<Arc<RecordSet>, ApiError> {
    state.session.snapshot().ok_or(ApiError::NoFileLoaded)
}

async fn options(State(state): State<AppState>) -> Result<Response<Body>, ApiError> {
    let records = loaded(&state)?;
    Ok(Json(json!({
        "date_span": records.date_span(),
        "bots": records.bot_names(),
        "status_codes": records.status_codes(),
        "records": records.len(),
        "total_lines": records.total_lines(),
        "skipped_lines": records.skipped_lines(),
    }))
    .into_response())
}

async fn query_views(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Response<Body>, ApiError> {
    let records = loaded(&state)?;
    let criteria = params.criteria()?;
    debug!(
        bot = %criteria.bot_name,
        status = %criteria.status_code,
        "computing views"
    );
    match query(&records, &criteria) {
        Ok(result) => Ok(Json(result.without_records()).into_response()),
        Err(e @ QueryError::NoMatches) => Ok(Json(json!({ "warning": e.to_string() })).into_response()),
    }
}

async fn records(
    State(state): State<AppState>,
    Query(params): Query<FilterParams>,
) -> Result<Response<Body>, ApiError> {
    let records = loaded(&state)?;
    let criteria = params.criteria()?;
    Ok(Json(records.apply(&criteria)).into_response())
}

async fn metrics(State(state): State<AppState>) -> Result<Response<Body>, ApiError> {
    if let Some(records) = state.session.snapshot() {
        state.metrics.export(&records);
    }
    let metric_families = state.metrics.registry.gather();
    let mut buffer = String::new();
    TextEncoder::new()
        .encode_utf8(&metric_families, &mut buffer)
        .map_err(|e| {
            error!(error = %e, "failed to encode metrics");
            ApiError::Internal(e.to_string())
        })?;
    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; version=0.0.4"),
        )],
        buffer,
    )
        .into_response())
}

/// Resolves on Ctrl+C or SIGTERM. If a handler cannot be installed the
/// server keeps running on the other one.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let reason = tokio::select! {
        _ = ctrl_c => "ctrl-c",
        _ = terminate => "sigterm",
    };
    info!(reason, "shutting down");
}
