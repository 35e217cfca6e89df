use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::grid::{LoadReading, ReferenceZone, ResolutionCode};
use crate::movies::{Movie, MovieSummary, UpdatedInfo};

use super::{ConditionalOutcome, DateTimeRange, Result, TitleRange};

/// Repository for the movies table.
#[async_trait]
pub trait MovieRepository: Send + Sync {
    /// Gets a movie by its full key. Absence is `Ok(None)`.
    async fn get_movie(&self, title: &str, year: i32) -> Result<Option<Movie>>;

    /// Writes a movie, overwriting any movie with the same key.
    async fn put_movie(&self, movie: &Movie) -> Result<()>;

    /// Overwrites rating, plot and actors, returning only the updated attributes.
    async fn update_movie(
        &self,
        title: &str,
        year: i32,
        rating: Decimal,
        plot: &str,
        actors: &[String],
    ) -> Result<Option<UpdatedInfo>>;

    /// Adds `delta` to the rating server-side and returns the new rating.
    async fn increment_rating(
        &self,
        title: &str,
        year: i32,
        delta: Decimal,
    ) -> Result<Option<Decimal>>;

    /// Removes the first actor if the movie has more than `min_actor_count` actors.
    async fn remove_first_actor(
        &self,
        title: &str,
        year: i32,
        min_actor_count: usize,
    ) -> Result<ConditionalOutcome<UpdatedInfo>>;

    /// Deletes the movie if its rating is at most `threshold`.
    async fn delete_if_underrated(
        &self,
        title: &str,
        year: i32,
        threshold: Decimal,
    ) -> Result<ConditionalOutcome<Movie>>;

    /// Gets every movie released in `year`, ordered by title.
    async fn query_by_year(&self, year: i32) -> Result<Vec<Movie>>;

    /// Gets the summaries of movies in `year` whose title falls in `range`.
    async fn query_by_year_and_title_range(
        &self,
        year: i32,
        range: &TitleRange,
    ) -> Result<Vec<MovieSummary>>;
}

/// Repository for the reference zones table.
#[async_trait]
pub trait ReferenceZoneRepository: Send + Sync {
    /// Gets every zone whose composite key starts with `<zone_id>_`.
    async fn query_zones_by_prefix(&self, zone_id: i64) -> Result<Vec<ReferenceZone>>;

    /// Writes a zone, overwriting any zone with the same key.
    async fn put_zone(&self, zone: &ReferenceZone) -> Result<()>;
}

/// Repository for the total-load readings table.
#[async_trait]
pub trait LoadReadingRepository: Send + Sync {
    /// Gets a single reading by zone and sort key.
    async fn get_load_reading(&self, zone_id: i64, date_time: &str)
        -> Result<Option<LoadReading>>;

    /// Gets the readings of a zone within a time range, oldest first.
    async fn query_load_readings(
        &self,
        zone_id: i64,
        range: DateTimeRange,
    ) -> Result<Vec<LoadReading>>;

    /// Writes a reading, overwriting any reading with the same key.
    async fn put_load_reading(&self, reading: &LoadReading) -> Result<()>;
}

/// Repository for the resolution codes table.
#[async_trait]
pub trait ResolutionCodeRepository: Send + Sync {
    /// Gets a resolution code by its ID.
    async fn get_resolution_code(&self, id: i64) -> Result<Option<ResolutionCode>>;

    /// Writes a resolution code, overwriting any code with the same ID.
    async fn put_resolution_code(&self, code: &ResolutionCode) -> Result<()>;
}
