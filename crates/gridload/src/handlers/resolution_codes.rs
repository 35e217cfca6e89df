//! Resolution codes resource.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    handlers::{error::error_response, AppError},
    state::AppState,
};

/// GET /resolution_codes/{id} - Get a single resolution code.
#[axum::debug_handler]
pub async fn get_resolution_code(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let code = state
        .timings
        .time(
            "get_resolution_code",
            state.resolution_repo.get_resolution_code(id),
        )
        .await?;

    Ok(match code {
        Some(code) => Json(code).into_response(),
        None => error_response(
            StatusCode::NOT_FOUND,
            format!("Resolution code not found: {id}"),
        )
        .into_response(),
    })
}
