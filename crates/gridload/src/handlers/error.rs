use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use gridload_core::grid::RequestError;
use gridload_core::storage::{repository_error_to_status_code, RangeError, RepositoryError};

/// Handler error. Request validation errors become 400s, repository errors
/// use the core status mapping, anything else is a 500.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn status_code(&self) -> StatusCode {
        if let Some(repo_error) = self.0.downcast_ref::<RepositoryError>() {
            let code = repository_error_to_status_code(repo_error);
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        } else if self.0.downcast_ref::<RequestError>().is_some()
            || self.0.downcast_ref::<RangeError>().is_some()
        {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Server-side failures are logged in full and answered generically.
        let message = if status.is_server_error() {
            tracing::error!(status = %status, error = ?self.0, "Request failed");
            status
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            tracing::warn!(status = %status, error = %self.0, "Request rejected");
            self.0.to_string()
        };

        error_response(status, message).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// JSON error body: `{"error": "<message>"}`.
pub fn error_response(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!({ "error": message.into() })))
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_request_error_is_bad_request() {
        let response = AppError::from(RequestError::MissingParameter("zone")).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing required parameter: zone");
    }

    #[tokio::test]
    async fn test_range_error_is_bad_request() {
        let response = AppError::from(RangeError::InvalidTimeRange).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_timeout_is_gateway_timeout_without_detail() {
        let error = RepositoryError::Timeout("Query on TotalLoadData exceeded".to_string());
        let response = AppError::from(error).into_response();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Gateway Timeout");
    }

    #[tokio::test]
    async fn test_connection_failure_is_unavailable() {
        let error = RepositoryError::ConnectionFailed("dispatch failure".to_string());
        let response = AppError::from(error).into_response();

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = body_json(response).await;
        assert!(!json["error"].as_str().unwrap().contains("dispatch"));
    }

    #[tokio::test]
    async fn test_unknown_error_is_internal() {
        let response = AppError(anyhow::anyhow!("boom")).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Internal Server Error");
    }
}
