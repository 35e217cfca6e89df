//! Pure functions for mapping repository errors to HTTP status codes.
//!
//! This module provides HTTP status code mappings for [`RepositoryError`] variants,
//! following the Functional Core pattern - pure functions with no side effects.

use super::RepositoryError;

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `ConnectionFailed` -> 503 (Service Unavailable)
/// - `Throttled` -> 503 (Service Unavailable)
/// - `Timeout` -> 504 (Gateway Timeout)
/// - `QueryFailed` -> 500 (Internal Server Error)
/// - `Serialization` -> 500 (Internal Server Error)
/// - `InvalidData` -> 500 (Internal Server Error)
/// - `InvalidInput` -> 400 (Bad Request)
///
/// # Examples
///
/// ```
/// use gridload_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::Timeout("Query".to_string());
/// assert_eq!(repository_error_to_status_code(&error), 504);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::ConnectionFailed(_) => 503,
        RepositoryError::Throttled(_) => 503,
        RepositoryError::Timeout(_) => 504,
        RepositoryError::QueryFailed(_) => 500,
        RepositoryError::Serialization(_) => 500,
        RepositoryError::InvalidData(_) => 500,
        RepositoryError::InvalidInput(_) => 400,
    }
}
