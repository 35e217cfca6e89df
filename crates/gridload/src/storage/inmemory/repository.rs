//! In-memory repository implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use gridload_core::grid::{zone_key_prefix, LoadReading, ReferenceZone, ResolutionCode};
use gridload_core::movies::{Movie, MovieSummary, UpdatedInfo};
use gridload_core::storage::{
    ConditionalOutcome, DateTimeRange, LoadReadingRepository, MovieRepository,
    ReferenceZoneRepository, RepositoryError, ResolutionCodeRepository, Result, TitleRange,
};

/// In-memory storage backend.
///
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    movies: Arc<RwLock<BTreeMap<(i32, String), Movie>>>,
    zones: Arc<RwLock<BTreeMap<(i64, String), ReferenceZone>>>,
    readings: Arc<RwLock<BTreeMap<(i64, String), LoadReading>>>,
    resolution_codes: Arc<RwLock<HashMap<i64, ResolutionCode>>>,
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            movies: Arc::new(RwLock::new(BTreeMap::new())),
            zones: Arc::new(RwLock::new(BTreeMap::new())),
            readings: Arc::new(RwLock::new(BTreeMap::new())),
            resolution_codes: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

fn movie_key(title: &str, year: i32) -> (i32, String) {
    (year, title.to_string())
}

#[async_trait]
impl MovieRepository for InMemoryRepository {
    async fn get_movie(&self, title: &str, year: i32) -> Result<Option<Movie>> {
        let movies = self.movies.read().await;
        Ok(movies.get(&movie_key(title, year)).cloned())
    }

    async fn put_movie(&self, movie: &Movie) -> Result<()> {
        let mut movies = self.movies.write().await;
        movies.insert(movie_key(&movie.title, movie.year), movie.clone());
        Ok(())
    }

    async fn update_movie(
        &self,
        title: &str,
        year: i32,
        rating: Decimal,
        plot: &str,
        actors: &[String],
    ) -> Result<Option<UpdatedInfo>> {
        let mut movies = self.movies.write().await;
        let Some(movie) = movies.get_mut(&movie_key(title, year)) else {
            return Ok(None);
        };

        movie.info.rating = Some(rating);
        movie.info.plot = Some(plot.to_string());
        movie.info.actors = actors.to_vec();

        Ok(Some(UpdatedInfo {
            rating: Some(rating),
            plot: Some(plot.to_string()),
            actors: Some(actors.to_vec()),
        }))
    }

    async fn increment_rating(
        &self,
        title: &str,
        year: i32,
        delta: Decimal,
    ) -> Result<Option<Decimal>> {
        let mut movies = self.movies.write().await;
        let Some(movie) = movies.get_mut(&movie_key(title, year)) else {
            return Ok(None);
        };

        let current = movie.info.rating.ok_or_else(|| {
            RepositoryError::QueryFailed(
                "The provided expression refers to an attribute that does not exist in the item: info.rating"
                    .to_string(),
            )
        })?;
        let rating = current + delta;
        movie.info.rating = Some(rating);

        Ok(Some(rating))
    }

    async fn remove_first_actor(
        &self,
        title: &str,
        year: i32,
        min_actor_count: usize,
    ) -> Result<ConditionalOutcome<UpdatedInfo>> {
        let mut movies = self.movies.write().await;
        let Some(movie) = movies.get_mut(&movie_key(title, year)) else {
            return Ok(ConditionalOutcome::NotFound);
        };

        if movie.info.actors.len() <= min_actor_count {
            tracing::info!(year, title, min_actor_count, "Actor list too short, nothing removed");
            return Ok(ConditionalOutcome::ConditionFailed);
        }

        movie.info.actors.remove(0);
        Ok(ConditionalOutcome::Applied(UpdatedInfo {
            actors: Some(movie.info.actors.clone()),
            ..UpdatedInfo::default()
        }))
    }

    async fn delete_if_underrated(
        &self,
        title: &str,
        year: i32,
        threshold: Decimal,
    ) -> Result<ConditionalOutcome<Movie>> {
        let mut movies = self.movies.write().await;
        let key = movie_key(title, year);
        let Some(movie) = movies.get(&key) else {
            return Ok(ConditionalOutcome::NotFound);
        };

        // A missing rating fails the comparison, as it does in DynamoDB.
        if !movie.info.rating.is_some_and(|rating| rating <= threshold) {
            tracing::info!(year, title, %threshold, "Rating above threshold, movie kept");
            return Ok(ConditionalOutcome::ConditionFailed);
        }

        Ok(movies
            .remove(&key)
            .map_or(ConditionalOutcome::NotFound, ConditionalOutcome::Applied))
    }

    async fn query_by_year(&self, year: i32) -> Result<Vec<Movie>> {
        let movies = self.movies.read().await;
        Ok(movies
            .iter()
            .filter(|((y, _), _)| *y == year)
            .map(|(_, movie)| movie.clone())
            .collect())
    }

    async fn query_by_year_and_title_range(
        &self,
        year: i32,
        range: &TitleRange,
    ) -> Result<Vec<MovieSummary>> {
        let movies = self.movies.read().await;
        Ok(movies
            .iter()
            .filter(|((y, title), _)| *y == year && range.contains(title))
            .map(|(_, movie)| movie.summary())
            .collect())
    }
}

#[async_trait]
impl ReferenceZoneRepository for InMemoryRepository {
    async fn query_zones_by_prefix(&self, zone_id: i64) -> Result<Vec<ReferenceZone>> {
        let prefix = zone_key_prefix(zone_id);
        let zones = self.zones.read().await;
        Ok(zones
            .iter()
            .filter(|((id, key), _)| *id == zone_id && key.starts_with(&prefix))
            .map(|(_, zone)| zone.clone())
            .collect())
    }

    async fn put_zone(&self, zone: &ReferenceZone) -> Result<()> {
        let mut zones = self.zones.write().await;
        zones.insert((zone.id, zone.composite_key.clone()), zone.clone());
        Ok(())
    }
}

#[async_trait]
impl LoadReadingRepository for InMemoryRepository {
    async fn get_load_reading(
        &self,
        zone_id: i64,
        date_time: &str,
    ) -> Result<Option<LoadReading>> {
        let readings = self.readings.read().await;
        Ok(readings.get(&(zone_id, date_time.to_string())).cloned())
    }

    async fn query_load_readings(
        &self,
        zone_id: i64,
        range: DateTimeRange,
    ) -> Result<Vec<LoadReading>> {
        let readings = self.readings.read().await;
        Ok(readings
            .iter()
            .filter(|((zone, date_time), _)| *zone == zone_id && range.contains_key(date_time))
            .map(|(_, reading)| reading.clone())
            .collect())
    }

    async fn put_load_reading(&self, reading: &LoadReading) -> Result<()> {
        let mut readings = self.readings.write().await;
        readings.insert(
            (reading.zone_reference_id, reading.date_time.clone()),
            reading.clone(),
        );
        Ok(())
    }
}

#[async_trait]
impl ResolutionCodeRepository for InMemoryRepository {
    async fn get_resolution_code(&self, id: i64) -> Result<Option<ResolutionCode>> {
        let codes = self.resolution_codes.read().await;
        Ok(codes.get(&id).cloned())
    }

    async fn put_resolution_code(&self, code: &ResolutionCode) -> Result<()> {
        let mut codes = self.resolution_codes.write().await;
        codes.insert(code.id, code.clone());
        Ok(())
    }
}
