//! Total-load readings resource.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use gridload_core::grid::{parse_time_range, parse_zone_id, LoadReading};
use gridload_core::serde::deserialize_optional_string;

use crate::{handlers::AppError, state::AppState};

/// Query parameters for `GET /energy_data`.
#[derive(Debug, Deserialize)]
pub struct EnergyDataQuery {
    /// Zone ID (required, integer)
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub zone: Option<String>,
    /// Inclusive lower bound (date or timestamp)
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub from: Option<String>,
    /// Inclusive upper bound (date or timestamp)
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub to: Option<String>,
}

/// GET /energy_data - Readings of one zone, oldest first.
#[axum::debug_handler]
pub async fn get_energy_data(
    State(state): State<AppState>,
    Query(query): Query<EnergyDataQuery>,
) -> Result<Json<Vec<LoadReading>>, AppError> {
    let zone_id = parse_zone_id(query.zone.as_deref())?;
    let range = parse_time_range(query.from.as_deref(), query.to.as_deref())?;

    let readings = state
        .timings
        .time(
            "query_load_readings",
            state.load_repo.query_load_readings(zone_id, range),
        )
        .await?;

    tracing::debug!(zone_id, count = readings.len(), "Served load readings");
    Ok(Json(readings))
}
