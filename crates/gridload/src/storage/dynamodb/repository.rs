//! DynamoDB repository implementation.
//!
//! Implements the repository traits from `gridload_core::storage` on top of
//! [`DynamoStore`]. Each method translates its arguments into one store
//! operation descriptor and its result back into domain types.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use rust_decimal::Decimal;

use gridload_core::grid::{zone_key_prefix, LoadReading, ReferenceZone, ResolutionCode};
use gridload_core::movies::{Movie, MovieSummary, UpdatedInfo};
use gridload_core::storage::{
    ConditionalOutcome, DateTimeRange, LoadReadingRepository, MovieRepository,
    ReferenceZoneRepository, ResolutionCodeRepository, Result, TitleRange,
};

use crate::config::{Config, TableNames};

use super::conversions::{
    attributes_to_updated_info, item_to_load_reading, item_to_movie, item_to_movie_summary,
    item_to_resolution_code, item_to_zone, load_reading_to_item, movie_to_item,
    resolution_code_to_item, string_list, zone_to_item,
};
use super::expressions::{Condition, KeyQuery, SortKeyCondition, Update};
use super::keys::{self, number};
use super::store::{DynamoStore, WriteOutcome};

/// DynamoDB-based repository implementation.
///
/// Provides async access to the four tables through one shared store client.
#[derive(Clone, Debug)]
pub struct DynamoDbRepository {
    store: DynamoStore,
    tables: TableNames,
}

impl DynamoDbRepository {
    /// Creates a new repository with the given store client and table names.
    pub fn new(store: DynamoStore, tables: TableNames) -> Self {
        Self { store, tables }
    }

    /// Creates a new repository from configuration.
    pub async fn from_config(config: &Config) -> Self {
        let store = DynamoStore::from_config(config).await;
        Self::new(store, config.tables.clone())
    }
}

// ============================================================================
// MovieRepository implementation
// ============================================================================

#[async_trait]
impl MovieRepository for DynamoDbRepository {
    async fn get_movie(&self, title: &str, year: i32) -> Result<Option<Movie>> {
        let item = self
            .store
            .get(&self.tables.movies, keys::movie_key(title, year))
            .await?;

        item.as_ref().map(item_to_movie).transpose()
    }

    async fn put_movie(&self, movie: &Movie) -> Result<()> {
        self.store
            .put(&self.tables.movies, movie_to_item(movie))
            .await?;

        tracing::debug!(year = movie.year, title = %movie.title, "Movie written");
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
        let update = Update::new(ReturnValue::UpdatedNew)
            .set("info.rating", number(rating))
            .set("info.plot", AttributeValue::S(plot.to_string()))
            .set("info.actors", string_list(actors))
            .condition(Condition::Exists(keys::MOVIE_TITLE.to_string()));

        let outcome = self
            .store
            .update(&self.tables.movies, keys::movie_key(title, year), &update)
            .await?;

        match outcome {
            WriteOutcome::Applied(attributes) => {
                attributes_to_updated_info(&attributes).map(Some)
            }
            WriteOutcome::ConditionFailed { .. } => {
                tracing::debug!(year, title, "Movie not found for update");
                Ok(None)
            }
        }
    }

    async fn increment_rating(
        &self,
        title: &str,
        year: i32,
        delta: Decimal,
    ) -> Result<Option<Decimal>> {
        let update = Update::new(ReturnValue::UpdatedNew)
            .increment("info.rating", number(delta))
            .condition(Condition::Exists(keys::MOVIE_TITLE.to_string()));

        let outcome = self
            .store
            .update(&self.tables.movies, keys::movie_key(title, year), &update)
            .await?;

        match outcome {
            WriteOutcome::Applied(attributes) => {
                Ok(attributes_to_updated_info(&attributes)?.rating)
            }
            WriteOutcome::ConditionFailed { .. } => Ok(None),
        }
    }

    async fn remove_first_actor(
        &self,
        title: &str,
        year: i32,
        min_actor_count: usize,
    ) -> Result<ConditionalOutcome<UpdatedInfo>> {
        let update = Update::new(ReturnValue::AllNew)
            .remove("info.actors[0]")
            .condition(Condition::SizeGreaterThan(
                "info.actors".to_string(),
                number(min_actor_count),
            ));

        let outcome = self
            .store
            .update(&self.tables.movies, keys::movie_key(title, year), &update)
            .await?
            .into_conditional();

        match outcome {
            ConditionalOutcome::Applied(item) => {
                let movie = item_to_movie(&item)?;
                Ok(ConditionalOutcome::Applied(UpdatedInfo {
                    actors: Some(movie.info.actors),
                    ..UpdatedInfo::default()
                }))
            }
            ConditionalOutcome::ConditionFailed => {
                tracing::info!(year, title, min_actor_count, "Actor list too short, nothing removed");
                Ok(ConditionalOutcome::ConditionFailed)
            }
            ConditionalOutcome::NotFound => Ok(ConditionalOutcome::NotFound),
        }
    }

    async fn delete_if_underrated(
        &self,
        title: &str,
        year: i32,
        threshold: Decimal,
    ) -> Result<ConditionalOutcome<Movie>> {
        let conditions = [Condition::AtMost("info.rating".to_string(), number(threshold))];

        let outcome = self
            .store
            .delete(&self.tables.movies, keys::movie_key(title, year), &conditions)
            .await?
            .into_conditional();

        match outcome {
            ConditionalOutcome::Applied(item) => {
                Ok(ConditionalOutcome::Applied(item_to_movie(&item)?))
            }
            ConditionalOutcome::ConditionFailed => {
                tracing::info!(year, title, %threshold, "Rating above threshold, movie kept");
                Ok(ConditionalOutcome::ConditionFailed)
            }
            ConditionalOutcome::NotFound => Ok(ConditionalOutcome::NotFound),
        }
    }

    async fn query_by_year(&self, year: i32) -> Result<Vec<Movie>> {
        let query = KeyQuery::partition(keys::MOVIE_YEAR, number(year));

        let items = self.store.query(&self.tables.movies, &query).await?;
        items.iter().map(item_to_movie).collect()
    }

    async fn query_by_year_and_title_range(
        &self,
        year: i32,
        range: &TitleRange,
    ) -> Result<Vec<MovieSummary>> {
        let query = KeyQuery::partition(keys::MOVIE_YEAR, number(year))
            .sort(
                keys::MOVIE_TITLE,
                SortKeyCondition::Between(
                    AttributeValue::S(range.low.clone()),
                    AttributeValue::S(range.high.clone()),
                ),
            )
            .project([
                keys::MOVIE_YEAR,
                keys::MOVIE_TITLE,
                "info.genres",
                "info.actors[0]",
            ]);

        let items = self.store.query(&self.tables.movies, &query).await?;
        items.iter().map(item_to_movie_summary).collect()
    }
}

// ============================================================================
// ReferenceZoneRepository implementation
// ============================================================================

#[async_trait]
impl ReferenceZoneRepository for DynamoDbRepository {
    async fn query_zones_by_prefix(&self, zone_id: i64) -> Result<Vec<ReferenceZone>> {
        let query = KeyQuery::partition(keys::ZONE_ID, number(zone_id)).sort(
            keys::ZONE_COMPOSITE_KEY,
            SortKeyCondition::BeginsWith(zone_key_prefix(zone_id)),
        );

        let items = self
            .store
            .query(&self.tables.reference_zones, &query)
            .await?;
        items.iter().map(item_to_zone).collect()
    }

    async fn put_zone(&self, zone: &ReferenceZone) -> Result<()> {
        self.store
            .put(&self.tables.reference_zones, zone_to_item(zone))
            .await
    }
}

// ============================================================================
// LoadReadingRepository implementation
// ============================================================================

/// Sort-key condition for an optionally bounded time range.
fn date_time_condition(range: &DateTimeRange) -> Option<SortKeyCondition> {
    match (range.start_key(), range.end_key()) {
        (Some(start), Some(end)) => Some(SortKeyCondition::Between(
            AttributeValue::S(start),
            AttributeValue::S(end),
        )),
        (Some(start), None) => Some(SortKeyCondition::AtLeast(AttributeValue::S(start))),
        (None, Some(end)) => Some(SortKeyCondition::AtMost(AttributeValue::S(end))),
        (None, None) => None,
    }
}

#[async_trait]
impl LoadReadingRepository for DynamoDbRepository {
    async fn get_load_reading(
        &self,
        zone_id: i64,
        date_time: &str,
    ) -> Result<Option<LoadReading>> {
        let item = self
            .store
            .get(
                &self.tables.total_load,
                keys::load_reading_key(zone_id, date_time),
            )
            .await?;

        item.as_ref().map(item_to_load_reading).transpose()
    }

    async fn query_load_readings(
        &self,
        zone_id: i64,
        range: DateTimeRange,
    ) -> Result<Vec<LoadReading>> {
        let mut query = KeyQuery::partition(keys::LOAD_ZONE_REFERENCE, number(zone_id));
        if let Some(condition) = date_time_condition(&range) {
            query = query.sort(keys::LOAD_DATE_TIME, condition);
        }

        let items = self.store.query(&self.tables.total_load, &query).await?;
        items.iter().map(item_to_load_reading).collect()
    }

    async fn put_load_reading(&self, reading: &LoadReading) -> Result<()> {
        self.store
            .put(&self.tables.total_load, load_reading_to_item(reading))
            .await
    }
}

// ============================================================================
// ResolutionCodeRepository implementation
// ============================================================================

#[async_trait]
impl ResolutionCodeRepository for DynamoDbRepository {
    async fn get_resolution_code(&self, id: i64) -> Result<Option<ResolutionCode>> {
        let item = self
            .store
            .get(&self.tables.resolution_codes, keys::resolution_code_key(id))
            .await?;

        item.as_ref().map(item_to_resolution_code).transpose()
    }

    async fn put_resolution_code(&self, code: &ResolutionCode) -> Result<()> {
        self.store
            .put(&self.tables.resolution_codes, resolution_code_to_item(code))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 10, day)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_bounded_range_uses_between() {
        let range = DateTimeRange::new(Some(at(13)), Some(at(20))).unwrap();

        assert_eq!(
            date_time_condition(&range),
            Some(SortKeyCondition::Between(
                AttributeValue::S("2020-10-13 00:00:00.000000000".to_string()),
                AttributeValue::S("2020-10-20 00:00:00.000000000".to_string()),
            ))
        );
    }

    #[test]
    fn test_fractional_bound_keeps_all_nine_digits() {
        let end = NaiveDate::from_ymd_opt(2020, 10, 20)
            .unwrap()
            .and_hms_nano_opt(0, 0, 0, 384_259_000)
            .unwrap();
        let range = DateTimeRange::new(Some(at(13)), Some(end)).unwrap();

        assert_eq!(
            date_time_condition(&range),
            Some(SortKeyCondition::Between(
                AttributeValue::S("2020-10-13 00:00:00.000000000".to_string()),
                AttributeValue::S("2020-10-20 00:00:00.384259000".to_string()),
            ))
        );
    }

    #[test]
    fn test_half_open_ranges() {
        let from = DateTimeRange::new(Some(at(13)), None).unwrap();
        assert!(matches!(
            date_time_condition(&from),
            Some(SortKeyCondition::AtLeast(_))
        ));

        let to = DateTimeRange::new(None, Some(at(20))).unwrap();
        assert!(matches!(
            date_time_condition(&to),
            Some(SortKeyCondition::AtMost(_))
        ));
    }

    #[test]
    fn test_unbounded_range_has_no_sort_condition() {
        assert_eq!(date_time_condition(&DateTimeRange::unbounded()), None);
    }
}
