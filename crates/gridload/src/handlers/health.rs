//! Liveness and diagnostics endpoints.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no store access)
//! - `/timings` - Last recorded duration per route and data-access call

use std::collections::BTreeMap;

use axum::{extract::State, http::StatusCode, Json};

use crate::state::AppState;

/// GET /livez - Basic liveness probe.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /timings - Last recorded durations in milliseconds.
#[axum::debug_handler]
pub async fn timings(State(state): State<AppState>) -> Json<BTreeMap<String, f64>> {
    Json(state.timings.snapshot_millis())
}
