use std::{env, time::Duration};

/// DynamoDB table names, overridable per table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub movies: String,
    pub reference_zones: String,
    pub total_load: String,
    pub resolution_codes: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            movies: "Movies".to_string(),
            reference_zones: "ReferenceZones".to_string(),
            total_load: "TotalLoadData".to_string(),
            resolution_codes: "ResolutionCodes".to_string(),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// AWS region used when the provider chain has none (default: "eu-west-3")
    pub aws_region: String,
    /// Endpoint override, e.g. `http://localhost:8000` for DynamoDB Local
    pub aws_endpoint_url: Option<String>,
    /// Upper bound on a single store operation in milliseconds (default: 5,000)
    pub store_timeout_ms: u64,
    /// Upper bound on a whole HTTP request in seconds (default: 10)
    pub request_timeout_secs: u64,
    /// Table names
    pub tables: TableNames,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `AWS_REGION` - AWS region (default: "eu-west-3")
    /// - `AWS_ENDPOINT_URL` - Endpoint override (default: none)
    /// - `STORE_TIMEOUT_MS` - Store operation timeout (default: 5,000)
    /// - `REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 10)
    /// - `MOVIES_TABLE`, `REFERENCE_ZONES_TABLE`, `TOTAL_LOAD_TABLE`,
    ///   `RESOLUTION_CODES_TABLE` - Table names
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = TableNames::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            aws_region: non_empty("AWS_REGION").unwrap_or_else(|| "eu-west-3".to_string()),
            aws_endpoint_url: non_empty("AWS_ENDPOINT_URL"),
            store_timeout_ms: non_empty("STORE_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(5_000),
            request_timeout_secs: non_empty("REQUEST_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            tables: TableNames {
                movies: non_empty("MOVIES_TABLE").unwrap_or(defaults.movies),
                reference_zones: non_empty("REFERENCE_ZONES_TABLE")
                    .unwrap_or(defaults.reference_zones),
                total_load: non_empty("TOTAL_LOAD_TABLE").unwrap_or(defaults.total_load),
                resolution_codes: non_empty("RESOLUTION_CODES_TABLE")
                    .unwrap_or(defaults.resolution_codes),
            },
        }
    }

    /// Get the store operation timeout as a Duration.
    #[cfg_attr(not(feature = "dynamodb"), allow(dead_code))]
    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    /// Get the HTTP request timeout as a Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
