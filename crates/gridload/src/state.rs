//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to all
//! request handlers. It holds repository trait objects for storage abstraction
//! and the timing registry; the backend is selected via feature flags.

use std::{sync::Arc, time::Duration};

use gridload_core::storage::{
    LoadReadingRepository, MovieRepository, ReferenceZoneRepository, ResolutionCodeRepository,
};

use crate::{config::Config, timing::CallTimings};

/// Shared application state.
///
/// This is cloned for each request handler. Every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub movie_repo: Arc<dyn MovieRepository>,
    pub zone_repo: Arc<dyn ReferenceZoneRepository>,
    pub load_repo: Arc<dyn LoadReadingRepository>,
    pub resolution_repo: Arc<dyn ResolutionCodeRepository>,
    /// Last recorded durations per route and data-access call.
    pub timings: CallTimings,
    /// Upper bound on a whole HTTP request.
    pub request_timeout: Duration,
}

impl AppState {
    /// Creates a new AppState over one repository implementing every table.
    pub fn with_repository<R>(repository: Arc<R>, config: &Config) -> Self
    where
        R: MovieRepository
            + ReferenceZoneRepository
            + LoadReadingRepository
            + ResolutionCodeRepository
            + 'static,
    {
        Self {
            movie_repo: repository.clone(),
            zone_repo: repository.clone(),
            load_repo: repository.clone(),
            resolution_repo: repository,
            timings: CallTimings::new(),
            request_timeout: config.request_timeout(),
        }
    }
}

// ============================================================================
// Backend constructors
// ============================================================================

#[cfg(feature = "dynamodb")]
mod dynamodb_backend {
    use super::*;
    use crate::storage::DynamoDbRepository;

    impl AppState {
        /// Creates a new AppState backed by DynamoDB.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            let repository = DynamoDbRepository::from_config(config).await;
            Ok(Self::with_repository(Arc::new(repository), config))
        }
    }
}

#[cfg(all(feature = "inmemory", not(feature = "dynamodb")))]
mod inmemory_backend {
    use super::*;
    use crate::storage::InMemoryRepository;

    impl AppState {
        /// Creates a new AppState with empty in-memory storage.
        pub async fn new(config: &Config) -> Result<Self, anyhow::Error> {
            tracing::warn!("Using in-memory storage, data is lost on shutdown");
            Ok(Self::with_repository(
                Arc::new(InMemoryRepository::new()),
                config,
            ))
        }
    }
}

#[cfg(test)]
mod test_support {
    use super::*;
    use crate::storage::InMemoryRepository;

    impl Default for AppState {
        /// Creates an AppState with empty in-memory storage for testing.
        fn default() -> Self {
            Self::with_repository(Arc::new(InMemoryRepository::new()), &Config::default())
        }
    }
}
