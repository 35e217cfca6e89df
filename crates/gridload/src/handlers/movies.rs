//! Movie handlers.
//!
//! Conditional operations answer 409 when the guard fails and 404 when the
//! movie does not exist.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gridload_core::grid::RequestError;
use gridload_core::movies::{Movie, MovieInfo};
use gridload_core::serde::{deserialize_optional_decimal, deserialize_optional_string};
use gridload_core::storage::{ConditionalOutcome, TitleRange};

use crate::{
    handlers::{error::error_response, AppError},
    state::AppState,
};

/// Query parameters for listing the movies of a year.
#[derive(Debug, Deserialize)]
pub struct ListMoviesQuery {
    /// Inclusive lower title bound
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub from: Option<String>,
    /// Inclusive upper title bound
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub to: Option<String>,
}

/// Request body for overwriting rating, plot and actors.
#[derive(Debug, Deserialize)]
pub struct UpdateMovieRequest {
    pub rating: Decimal,
    pub plot: String,
    pub actors: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct IncrementRatingRequest {
    pub delta: Decimal,
}

#[derive(Debug, Serialize)]
pub struct RatingResponse {
    pub rating: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct RemoveActorQuery {
    /// The first actor is removed only if the movie has more actors than this
    #[serde(default)]
    pub min_actors: usize,
}

#[derive(Debug, Deserialize)]
pub struct DeleteMovieQuery {
    /// The movie is deleted only if its rating is at most this value (required)
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub max_rating: Option<Decimal>,
}

fn not_found(title: &str, year: i32) -> Response {
    error_response(
        StatusCode::NOT_FOUND,
        format!("Movie not found: {title} ({year})"),
    )
    .into_response()
}

fn outcome_response<T: Serialize>(
    outcome: ConditionalOutcome<T>,
    title: &str,
    year: i32,
) -> Response {
    match outcome {
        ConditionalOutcome::Applied(value) => (StatusCode::OK, Json(value)).into_response(),
        ConditionalOutcome::ConditionFailed => error_response(
            StatusCode::CONFLICT,
            format!("Condition not met for movie: {title} ({year})"),
        )
        .into_response(),
        ConditionalOutcome::NotFound => not_found(title, year),
    }
}

/// GET /movies/{year} - All movies of a year, or projected summaries within a title range.
#[axum::debug_handler]
pub async fn list_movies(
    State(state): State<AppState>,
    Path(year): Path<i32>,
    Query(query): Query<ListMoviesQuery>,
) -> Result<Response, AppError> {
    match (query.from, query.to) {
        (None, None) => {
            let movies = state
                .timings
                .time("query_by_year", state.movie_repo.query_by_year(year))
                .await?;
            Ok(Json(movies).into_response())
        }
        (Some(from), Some(to)) => {
            let range = TitleRange::new(from, to)?;
            let summaries = state
                .timings
                .time(
                    "query_by_year_and_title_range",
                    state.movie_repo.query_by_year_and_title_range(year, &range),
                )
                .await?;
            Ok(Json(summaries).into_response())
        }
        (None, Some(_)) => Err(RequestError::MissingParameter("from").into()),
        (Some(_), None) => Err(RequestError::MissingParameter("to").into()),
    }
}

/// GET /movies/{year}/{title} - Get a single movie.
#[axum::debug_handler]
pub async fn get_movie(
    State(state): State<AppState>,
    Path((year, title)): Path<(i32, String)>,
) -> Result<Response, AppError> {
    let movie = state
        .timings
        .time("get_movie", state.movie_repo.get_movie(&title, year))
        .await?;

    Ok(match movie {
        Some(movie) => Json(movie).into_response(),
        None => not_found(&title, year),
    })
}

/// PUT /movies/{year}/{title} - Write a movie, replacing any existing one.
#[axum::debug_handler]
pub async fn put_movie(
    State(state): State<AppState>,
    Path((year, title)): Path<(i32, String)>,
    Json(info): Json<MovieInfo>,
) -> Result<Json<Movie>, AppError> {
    let movie = Movie { year, title, info };

    state
        .timings
        .time("put_movie", state.movie_repo.put_movie(&movie))
        .await?;

    Ok(Json(movie))
}

/// PATCH /movies/{year}/{title} - Overwrite rating, plot and actors.
#[axum::debug_handler]
pub async fn update_movie(
    State(state): State<AppState>,
    Path((year, title)): Path<(i32, String)>,
    Json(request): Json<UpdateMovieRequest>,
) -> Result<Response, AppError> {
    let updated = state
        .timings
        .time(
            "update_movie",
            state.movie_repo.update_movie(
                &title,
                year,
                request.rating,
                &request.plot,
                &request.actors,
            ),
        )
        .await?;

    Ok(match updated {
        Some(info) => Json(info).into_response(),
        None => not_found(&title, year),
    })
}

/// POST /movies/{year}/{title}/rating - Add `delta` to the rating.
#[axum::debug_handler]
pub async fn increment_rating(
    State(state): State<AppState>,
    Path((year, title)): Path<(i32, String)>,
    Json(request): Json<IncrementRatingRequest>,
) -> Result<Response, AppError> {
    let rating = state
        .timings
        .time(
            "increment_rating",
            state
                .movie_repo
                .increment_rating(&title, year, request.delta),
        )
        .await?;

    Ok(match rating {
        Some(rating) => Json(RatingResponse { rating }).into_response(),
        None => not_found(&title, year),
    })
}

/// POST /movies/{year}/{title}/actors/remove-first - Drop the first actor if enough remain.
#[axum::debug_handler]
pub async fn remove_first_actor(
    State(state): State<AppState>,
    Path((year, title)): Path<(i32, String)>,
    Query(query): Query<RemoveActorQuery>,
) -> Result<Response, AppError> {
    let outcome = state
        .timings
        .time(
            "remove_first_actor",
            state
                .movie_repo
                .remove_first_actor(&title, year, query.min_actors),
        )
        .await?;

    Ok(outcome_response(outcome, &title, year))
}

/// DELETE /movies/{year}/{title}?max_rating=R - Delete the movie if its rating is at most R.
#[axum::debug_handler]
pub async fn delete_movie(
    State(state): State<AppState>,
    Path((year, title)): Path<(i32, String)>,
    Query(query): Query<DeleteMovieQuery>,
) -> Result<Response, AppError> {
    let threshold = query
        .max_rating
        .ok_or(RequestError::MissingParameter("max_rating"))?;

    let outcome = state
        .timings
        .time(
            "delete_if_underrated",
            state
                .movie_repo
                .delete_if_underrated(&title, year, threshold),
        )
        .await?;

    Ok(outcome_response(outcome, &title, year))
}
