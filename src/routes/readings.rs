//! Readings endpoint
//!
//! `GET /api/get_readings?range=<preset>&date=<YYYY-MM-DD>` runs a range
//! query and returns the series as a plain JSON array, which is what the
//! charting frontend consumes. Diagnostics are logged server-side rather
//! than returned.

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::query::{QueryWindow, WindowPreset};
use crate::routes::AppState;

/// Query parameters for the readings endpoint
#[derive(Debug, Deserialize)]
struct ReadingsQuery {
    /// Window preset label; the configured default applies when absent
    range: Option<String>,
    /// Reference date (`YYYY-MM-DD`); "now" when absent
    date: Option<String>,
}

/// Create a subrouter containing the readings route
pub fn router() -> Router<AppState> {
    Router::new().route("/api/get_readings", get(handler))
}

async fn handler(
    Query(params): Query<ReadingsQuery>,
    State((engine, config)): State<AppState>,
) -> impl IntoResponse {
    let preset = match params.range.as_deref() {
        None => config.default_window,
        Some(label) => match label.parse::<WindowPreset>() {
            Ok(preset) => preset,
            Err(err) => return bad_request(err.to_string()),
        },
    };

    let reference_time = match resolve_reference_time(params.date.as_deref(), Utc::now()) {
        Ok(instant) => instant,
        Err(err) => return bad_request(err.to_string()),
    };

    let window = QueryWindow::with_preset(reference_time, preset);

    // The engine does blocking filesystem work
    let result = tokio::task::spawn_blocking(move || engine.query(&window)).await;

    match result {
        Ok(Ok(series)) => {
            if !series.diagnostics.is_clean() {
                warn!(
                    shards_skipped = series.diagnostics.shards_skipped,
                    records_skipped = series.diagnostics.records_skipped,
                    "query returned partial data"
                );
            }
            info!(range = %preset, readings = series.len(), "served readings");
            (StatusCode::OK, Json(series.readings)).into_response()
        }
        Ok(Err(err)) if err.is_invalid_window() => bad_request(err.to_string()),
        Ok(Err(err)) if err.is_storage_unavailable() => {
            warn!(error = %err, "shard directory unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "storage unavailable" })),
            )
                .into_response()
        }
        Ok(Err(err)) => {
            error!(error = %err, "query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal error" })),
            )
                .into_response()
        }
        Err(err) => {
            error!(error = %err, "query task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "internal error" })),
            )
                .into_response()
        }
    }
}

fn bad_request(message: String) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Work out the window end from the optional `date` parameter
///
/// No date means "now". A date naming today also means "now" (the day is
/// still running); any other date means the end of that day, so the window
/// covers its evening rather than its small hours.
fn resolve_reference_time(date: Option<&str>, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let Some(raw) = date else {
        return Ok(now);
    };

    let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| Error::invalid_window(format!("unparsable reference date: {}", raw)))?;

    if day == now.date_naive() {
        return Ok(now);
    }

    Utc.from_local_datetime(&day.and_hms_opt(23, 59, 59).ok_or_else(|| {
        Error::invalid_window(format!("unrepresentable reference date: {}", raw))
    })?)
    .single()
    .ok_or_else(|| Error::invalid_window(format!("unrepresentable reference date: {}", raw)))
}
