use thiserror::Error;

use crate::storage::RangeError;

/// Errors raised while turning raw request parameters into query inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Parameter {name} must be an integer, got {value:?}")]
    InvalidInteger { name: &'static str, value: String },
    #[error("Parameter {name} must be an ISO-8601 date or timestamp, got {value:?}")]
    InvalidTimestamp { name: &'static str, value: String },
    #[error(transparent)]
    Range(#[from] RangeError),
}
