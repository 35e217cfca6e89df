//! Reference zones resource.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use gridload_core::grid::{parse_zone_id, ReferenceZone};
use gridload_core::serde::deserialize_optional_string;

use crate::{handlers::AppError, state::AppState};

/// Query parameters for `GET /ref_zones`.
#[derive(Debug, Deserialize)]
pub struct RefZonesQuery {
    /// Zone ID (required, integer)
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub zone: Option<String>,
}

/// GET /ref_zones - Every record of a zone, by composite-key prefix.
#[axum::debug_handler]
pub async fn get_ref_zones(
    State(state): State<AppState>,
    Query(query): Query<RefZonesQuery>,
) -> Result<Json<Vec<ReferenceZone>>, AppError> {
    let zone_id = parse_zone_id(query.zone.as_deref())?;

    let zones = state
        .timings
        .time(
            "query_zones_by_prefix",
            state.zone_repo.query_zones_by_prefix(zone_id),
        )
        .await?;

    tracing::debug!(zone_id, count = zones.len(), "Served reference zones");
    Ok(Json(zones))
}
