use axum::{
    http::{header, Method, StatusCode},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    handlers::{
        energy_data::get_energy_data,
        health::{livez, timings},
        movies::{
            delete_movie, get_movie, increment_rating, list_movies, put_movie,
            remove_first_actor, update_movie,
        },
        ref_zones::get_ref_zones,
        resolution_codes::get_resolution_code,
    },
    state::AppState,
    timing::record_route_timing,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    let movie_routes = Router::new()
        .route("/movies/{year}", get(list_movies))
        .route(
            "/movies/{year}/{title}",
            get(get_movie)
                .put(put_movie)
                .patch(update_movie)
                .delete(delete_movie),
        )
        .route("/movies/{year}/{title}/rating", post(increment_rating))
        .route(
            "/movies/{year}/{title}/actors/remove-first",
            post(remove_first_actor),
        );

    Router::new()
        .route("/energy_data", get(get_energy_data))
        .route("/ref_zones", get(get_ref_zones))
        .route("/resolution_codes/{id}", get(get_resolution_code))
        .merge(movie_routes)
        .route("/livez", get(livez))
        .route("/timings", get(timings))
        .layer(middleware::from_fn_with_state(
            state.timings.clone(),
            record_route_timing,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            state.request_timeout,
        ))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;

    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    use gridload_core::grid::{LoadReading, ReferenceZone, ResolutionCode};
    use gridload_core::movies::Movie;
    use gridload_core::storage::{
        LoadReadingRepository, MovieRepository, ReferenceZoneRepository, ResolutionCodeRepository,
    };

    use super::*;
    use crate::config::Config;
    use crate::storage::InMemoryRepository;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    async fn seeded_state() -> AppState {
        let repo = Arc::new(InMemoryRepository::new());

        for (date_time, value) in [
            ("2020-10-12 23:45:00.000000000", "998.25"),
            ("2020-10-13 00:00:00.000000000", "1234.5"),
            ("2020-10-13 00:00:00.384259000", "1240"),
            ("2020-10-14 00:00:00.000000000", "1300.75"),
        ] {
            repo.put_load_reading(&LoadReading::new(42, date_time, dec(value)))
                .await
                .unwrap();
        }

        repo.put_zone(&ReferenceZone::new(42, 3)).await.unwrap();
        repo.put_zone(&ReferenceZone::new(420, 3)).await.unwrap();

        repo.put_resolution_code(&ResolutionCode {
            id: 2,
            text: "PT15M".to_string(),
            note: None,
        })
        .await
        .unwrap();

        repo.put_movie(
            &Movie::new(2013, "Rush")
                .with_rating(dec("5"))
                .with_actors(["Daniel Bruhl", "Chris Hemsworth", "Olivia Wilde"])
                .with_genres(["Action", "Drama"]),
        )
        .await
        .unwrap();
        repo.put_movie(&Movie::new(2013, "Prisoners").with_rating(dec("8.2")))
            .await
            .unwrap();

        AppState::with_repository(repo, &Config::default())
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header("Content-Type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        send(app, "GET", uri, None).await
    }

    #[tokio::test]
    async fn test_livez() {
        let app = create_app(AppState::default());

        let (status, _) = get_json(app, "/livez").await;

        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_energy_data_without_zone_is_bad_request() {
        let app = create_app(AppState::default());

        let (status, json) = get_json(app, "/energy_data").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "Missing required parameter: zone");
    }

    #[tokio::test]
    async fn test_energy_data_rejects_invalid_parameters() {
        let state = seeded_state().await;

        for uri in [
            "/energy_data?zone=abc",
            "/energy_data?zone=42&from=yesterday",
            "/energy_data?zone=42&from=2020-10-20&to=2020-10-13",
        ] {
            let (status, json) = get_json(create_app(state.clone()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert!(json["error"].is_string());
        }
    }

    #[tokio::test]
    async fn test_energy_data_for_a_day() {
        let app = create_app(seeded_state().await);

        let (status, json) =
            get_json(app, "/energy_data?zone=42&from=2020-10-13&to=2020-10-13").await;

        assert_eq!(status, StatusCode::OK);
        let readings = json.as_array().unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0]["zoneReferenceId"], 42);
        assert_eq!(readings[0]["dateTime"], "2020-10-13 00:00:00.000000000");
        assert_eq!(readings[0]["totalLoadValue"], "1234.5");
        assert_eq!(readings[1]["dateTime"], "2020-10-13 00:00:00.384259000");
    }

    #[tokio::test]
    async fn test_energy_data_includes_readings_on_fractional_bounds() {
        let repo = Arc::new(InMemoryRepository::new());
        for (date_time, value) in [
            ("2020-10-13 00:00:00.384258999", "1"),
            ("2020-10-13 00:00:00.384259000", "2"),
            ("2020-10-20 00:00:00.384259000", "3"),
            ("2020-10-20 00:00:00.384259001", "4"),
        ] {
            repo.put_load_reading(&LoadReading::new(42, date_time, dec(value)))
                .await
                .unwrap();
        }
        let app = create_app(AppState::with_repository(repo, &Config::default()));

        let (status, json) = get_json(
            app,
            "/energy_data?zone=42&from=2020-10-13%2000:00:00.384259000&to=2020-10-20%2000:00:00.384259000",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let values: Vec<_> = json
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["totalLoadValue"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(values, vec!["2", "3"]);
    }

    #[tokio::test]
    async fn test_energy_data_whole_second_bound_matches_fixture_key() {
        let app = create_app(seeded_state().await);

        let (status, json) = get_json(
            app,
            "/energy_data?zone=42&from=2020-10-14%2000:00:00&to=2020-10-14%2000:00:00",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let readings = json.as_array().unwrap();
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0]["totalLoadValue"], "1300.75");
    }

    #[tokio::test]
    async fn test_energy_data_without_range_returns_partition() {
        let app = create_app(seeded_state().await);

        let (status, json) = get_json(app, "/energy_data?zone=42&from=&to=").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_ref_zones_without_zone_is_bad_request() {
        let app = create_app(AppState::default());

        let (status, json) = get_json(app, "/ref_zones").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].as_str().unwrap().contains("zone"));
    }

    #[tokio::test]
    async fn test_ref_zones_match_exact_prefix() {
        let app = create_app(seeded_state().await);

        let (status, json) = get_json(app, "/ref_zones?zone=42").await;

        assert_eq!(status, StatusCode::OK);
        let zones = json.as_array().unwrap();
        assert_eq!(zones.len(), 1);
        assert_eq!(zones[0]["compositeKey"], "42_3");
        assert_eq!(zones[0]["countryForeignKey"], 3);
    }

    #[tokio::test]
    async fn test_resolution_code_lookup() {
        let state = seeded_state().await;

        let (status, json) = get_json(create_app(state.clone()), "/resolution_codes/2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["text"], "PT15M");

        let (status, _) = get_json(create_app(state), "/resolution_codes/9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_missing_movie_is_not_found() {
        let app = create_app(AppState::default());

        let (status, json) = get_json(app, "/movies/2013/Rush").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(json["error"].as_str().unwrap().contains("Rush"));
    }

    #[tokio::test]
    async fn test_put_then_get_movie() {
        let state = AppState::default();

        let (status, _) = send(
            create_app(state.clone()),
            "PUT",
            "/movies/2013/Rush",
            Some(r#"{"plot": "Rivals.", "rating": "8.3", "actors": ["Daniel Bruhl"]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = get_json(create_app(state), "/movies/2013/Rush").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "Rush");
        assert_eq!(json["info"]["rating"], "8.3");
        assert_eq!(json["info"]["actors"][0], "Daniel Bruhl");
    }

    #[tokio::test]
    async fn test_update_movie() {
        let state = seeded_state().await;

        let (status, json) = send(
            create_app(state.clone()),
            "PATCH",
            "/movies/2013/Rush",
            Some(r#"{"rating": "5.5", "plot": "Everything happens all at once.", "actors": ["Larry", "Moe", "Curly"]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rating"], "5.5");
        assert_eq!(json["actors"].as_array().unwrap().len(), 3);

        let (status, _) = send(
            create_app(state),
            "PATCH",
            "/movies/2013/Missing",
            Some(r#"{"rating": "1", "plot": "", "actors": []}"#),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_increment_rating_twice() {
        let state = seeded_state().await;

        let (status, json) = send(
            create_app(state.clone()),
            "POST",
            "/movies/2013/Rush/rating",
            Some(r#"{"delta": 1}"#),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rating"], "6");

        let (_, json) = send(
            create_app(state),
            "POST",
            "/movies/2013/Rush/rating",
            Some(r#"{"delta": "2"}"#),
        )
        .await;
        assert_eq!(json["rating"], "8");
    }

    #[tokio::test]
    async fn test_remove_first_actor_conflict_then_success() {
        let state = seeded_state().await;

        let (status, _) = send(
            create_app(state.clone()),
            "POST",
            "/movies/2013/Rush/actors/remove-first?min_actors=3",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, json) = send(
            create_app(state.clone()),
            "POST",
            "/movies/2013/Rush/actors/remove-first?min_actors=2",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["actors"][0], "Chris Hemsworth");

        let (status, _) = send(
            create_app(state),
            "POST",
            "/movies/1999/Missing/actors/remove-first",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_movie_respects_threshold() {
        let state = seeded_state().await;

        let (status, _) = send(
            create_app(state.clone()),
            "DELETE",
            "/movies/2013/Prisoners?max_rating=5",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, json) = send(
            create_app(state.clone()),
            "DELETE",
            "/movies/2013/Rush?max_rating=5",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["title"], "Rush");

        let (status, _) = get_json(create_app(state.clone()), "/movies/2013/Rush").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(create_app(state), "DELETE", "/movies/2013/Prisoners", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_movies_by_year_and_range() {
        let state = seeded_state().await;

        let (status, json) = get_json(create_app(state.clone()), "/movies/2013").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json.as_array().unwrap().len(), 2);

        let (status, json) = get_json(create_app(state.clone()), "/movies/2013?from=R&to=Z").await;
        assert_eq!(status, StatusCode::OK);
        let summaries = json.as_array().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0]["title"], "Rush");
        assert_eq!(summaries[0]["leadActor"], "Daniel Bruhl");
        assert!(summaries[0].get("info").is_none());

        let (status, _) = get_json(create_app(state.clone()), "/movies/2013?from=Z&to=A").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json(create_app(state), "/movies/2013?from=A").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_timings_record_routes_and_calls() {
        let state = seeded_state().await;

        get_json(create_app(state.clone()), "/energy_data?zone=42").await;
        let (status, json) = get_json(create_app(state), "/timings").await;

        assert_eq!(status, StatusCode::OK);
        assert!(json["GET /energy_data"].is_number());
        assert!(json["query_load_readings"].is_number());
    }
}
