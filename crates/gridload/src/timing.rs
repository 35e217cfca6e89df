//! Wall-clock timing of routes and data-access calls.
//!
//! [`CallTimings`] keeps the most recent duration per name. Routes are timed
//! by [`record_route_timing`], keyed `"<METHOD> <matched path>"`; individual
//! calls are timed by wrapping them in [`CallTimings::time`].

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};

/// Registry of the last recorded duration per instrumented name.
#[derive(Debug, Clone, Default)]
pub struct CallTimings {
    last: Arc<RwLock<HashMap<String, Duration>>>,
}

impl CallTimings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, name: impl Into<String>, elapsed: Duration) {
        let name = name.into();
        tracing::trace!(name = %name, elapsed_ms = elapsed.as_secs_f64() * 1000.0, "Timing recorded");
        if let Ok(mut last) = self.last.write() {
            last.insert(name, elapsed);
        }
    }

    /// Last durations in milliseconds, ordered by name.
    pub fn snapshot_millis(&self) -> BTreeMap<String, f64> {
        self.last
            .read()
            .ok()
            .map(|last| {
                last.iter()
                    .map(|(name, elapsed)| (name.clone(), elapsed.as_secs_f64() * 1000.0))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Awaits `future` and records how long it took under `name`.
    pub async fn time<F: Future>(&self, name: &'static str, future: F) -> F::Output {
        let start = Instant::now();
        let output = future.await;
        self.record(name, start.elapsed());
        output
    }
}

/// Middleware recording the elapsed time of every matched route.
pub async fn record_route_timing(
    State(timings): State<CallTimings>,
    request: Request,
    next: Next,
) -> Response {
    let name = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| format!("{} {}", request.method(), path.as_str()));

    let start = Instant::now();
    let response = next.run(request).await;

    if let Some(name) = name {
        timings.record(name, start.elapsed());
    }
    response
}
