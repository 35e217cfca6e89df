use thiserror::Error;

/// Errors that can occur when constructing a query range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("Invalid time range: start must be before or equal to end")]
    InvalidTimeRange,
    #[error("Invalid title range: low bound must sort before or equal to high bound")]
    InvalidTitleRange,
}

/// Errors that can occur during repository operations.
///
/// Absence and failed conditions are not errors: lookups return `None` and
/// conditional writes return a [`ConditionalOutcome`](super::ConditionalOutcome).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Throttled: {0}")]
    Throttled(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<RangeError> for RepositoryError {
    fn from(err: RangeError) -> Self {
        RepositoryError::InvalidInput(err.to_string())
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_error_display() {
        assert_eq!(
            RangeError::InvalidTimeRange.to_string(),
            "Invalid time range: start must be before or equal to end"
        );
    }

    #[test]
    fn test_repository_error_connection_failed_display() {
        let error = RepositoryError::ConnectionFailed("dispatch failure".to_string());
        assert_eq!(error.to_string(), "Connection failed: dispatch failure");
    }

    #[test]
    fn test_repository_error_timeout_display() {
        let error = RepositoryError::Timeout("Query exceeded 5s".to_string());
        assert_eq!(error.to_string(), "Timed out: Query exceeded 5s");
    }

    #[test]
    fn test_repository_error_invalid_data_display() {
        let error = RepositoryError::InvalidData("Missing or invalid field: title".to_string());
        assert_eq!(
            error.to_string(),
            "Invalid data: Missing or invalid field: title"
        );
    }

    #[test]
    fn test_range_error_converts_to_invalid_input() {
        let error: RepositoryError = RangeError::InvalidTitleRange.into();
        assert!(matches!(error, RepositoryError::InvalidInput(_)));
    }
}
