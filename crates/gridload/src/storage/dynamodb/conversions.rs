//! DynamoDB attribute conversion functions.
//!
//! Pure functions for converting between DynamoDB AttributeValue maps and domain types.
//! These are testable in isolation without DynamoDB access. Numbers travel as
//! the store's decimal text, never through a float.

use std::collections::HashMap;
use std::str::FromStr;

use aws_sdk_dynamodb::types::AttributeValue;
use gridload_core::grid::{LoadReading, ReferenceZone, ResolutionCode};
use gridload_core::movies::{Movie, MovieInfo, MovieSummary, UpdatedInfo};
use gridload_core::storage::RepositoryError;
use rust_decimal::Decimal;

use super::keys::{self, number};
use super::store::Item;

// ============================================================================
// Movie conversions
// ============================================================================

/// Convert a Movie to DynamoDB item.
pub fn movie_to_item(movie: &Movie) -> Item {
    let mut item = keys::movie_key(&movie.title, movie.year);
    item.insert(
        keys::MOVIE_INFO.to_string(),
        AttributeValue::M(movie_info_to_map(&movie.info)),
    );
    item
}

fn movie_info_to_map(info: &MovieInfo) -> Item {
    let mut map = HashMap::new();

    if let Some(plot) = &info.plot {
        map.insert("plot".to_string(), AttributeValue::S(plot.clone()));
    }
    if let Some(rating) = info.rating {
        map.insert("rating".to_string(), number(rating));
    }
    map.insert("actors".to_string(), string_list(&info.actors));
    map.insert("genres".to_string(), string_list(&info.genres));
    map.insert("directors".to_string(), string_list(&info.directors));
    if let Some(release_date) = &info.release_date {
        map.insert(
            "release_date".to_string(),
            AttributeValue::S(release_date.clone()),
        );
    }
    if let Some(running_time_secs) = info.running_time_secs {
        map.insert("running_time_secs".to_string(), number(running_time_secs));
    }

    map
}

/// Convert a DynamoDB item to Movie.
pub fn item_to_movie(item: &Item) -> Result<Movie, RepositoryError> {
    let info = match get_optional_map(item, keys::MOVIE_INFO)? {
        Some(info) => MovieInfo {
            plot: get_optional_string(info, "plot"),
            rating: get_optional_decimal(info, "rating")?,
            actors: get_string_list(info, "actors")?,
            genres: get_string_list(info, "genres")?,
            directors: get_string_list(info, "directors")?,
            release_date: get_optional_string(info, "release_date"),
            running_time_secs: get_optional_number(info, "running_time_secs")?,
        },
        None => MovieInfo::default(),
    };

    Ok(Movie {
        year: get_number(item, keys::MOVIE_YEAR)?,
        title: get_string(item, keys::MOVIE_TITLE)?,
        info,
    })
}

/// Convert a projected item (`year, title, info.genres, info.actors[0]`) to MovieSummary.
pub fn item_to_movie_summary(item: &Item) -> Result<MovieSummary, RepositoryError> {
    let (genres, lead_actor) = match get_optional_map(item, keys::MOVIE_INFO)? {
        Some(info) => (
            get_string_list(info, "genres")?,
            get_string_list(info, "actors")?.into_iter().next(),
        ),
        None => (Vec::new(), None),
    };

    Ok(MovieSummary {
        year: get_number(item, keys::MOVIE_YEAR)?,
        title: get_string(item, keys::MOVIE_TITLE)?,
        genres,
        lead_actor,
    })
}

/// Convert the attributes returned by an update to UpdatedInfo.
pub fn attributes_to_updated_info(attributes: &Item) -> Result<UpdatedInfo, RepositoryError> {
    let Some(info) = get_optional_map(attributes, keys::MOVIE_INFO)? else {
        return Ok(UpdatedInfo::default());
    };

    let actors = match info.get("actors") {
        Some(_) => Some(get_string_list(info, "actors")?),
        None => None,
    };

    Ok(UpdatedInfo {
        rating: get_optional_decimal(info, "rating")?,
        plot: get_optional_string(info, "plot"),
        actors,
    })
}

// ============================================================================
// Load reading conversions
// ============================================================================

/// Convert a LoadReading to DynamoDB item.
pub fn load_reading_to_item(reading: &LoadReading) -> Item {
    let mut item = keys::load_reading_key(reading.zone_reference_id, &reading.date_time);
    item.insert(
        keys::LOAD_TOTAL_VALUE.to_string(),
        number(reading.total_load_value),
    );
    item
}

/// Convert a DynamoDB item to LoadReading.
pub fn item_to_load_reading(item: &Item) -> Result<LoadReading, RepositoryError> {
    Ok(LoadReading {
        zone_reference_id: get_number(item, keys::LOAD_ZONE_REFERENCE)?,
        date_time: get_string(item, keys::LOAD_DATE_TIME)?,
        total_load_value: get_decimal(item, keys::LOAD_TOTAL_VALUE)?,
    })
}

// ============================================================================
// Reference zone conversions
// ============================================================================

/// Convert a ReferenceZone to DynamoDB item.
pub fn zone_to_item(zone: &ReferenceZone) -> Item {
    let mut item = HashMap::new();

    item.insert(keys::ZONE_ID.to_string(), number(zone.id));
    item.insert(
        keys::ZONE_COMPOSITE_KEY.to_string(),
        AttributeValue::S(zone.composite_key.clone()),
    );
    item.insert(keys::ZONE_COUNTRY_FK.to_string(), number(zone.country_fk));
    if let Some(added_on) = &zone.added_on {
        item.insert(
            keys::ZONE_ADDED_ON.to_string(),
            AttributeValue::S(added_on.clone()),
        );
    }

    item
}

/// Convert a DynamoDB item to ReferenceZone.
pub fn item_to_zone(item: &Item) -> Result<ReferenceZone, RepositoryError> {
    Ok(ReferenceZone {
        id: get_number(item, keys::ZONE_ID)?,
        country_fk: get_number(item, keys::ZONE_COUNTRY_FK)?,
        composite_key: get_string(item, keys::ZONE_COMPOSITE_KEY)?,
        added_on: get_optional_string(item, keys::ZONE_ADDED_ON),
    })
}

// ============================================================================
// Resolution code conversions
// ============================================================================

/// Convert a ResolutionCode to DynamoDB item.
pub fn resolution_code_to_item(code: &ResolutionCode) -> Item {
    let mut item = keys::resolution_code_key(code.id);
    item.insert(
        keys::CODE_TEXT.to_string(),
        AttributeValue::S(code.text.clone()),
    );
    if let Some(note) = &code.note {
        item.insert(keys::CODE_NOTE.to_string(), AttributeValue::S(note.clone()));
    }
    item
}

/// Convert a DynamoDB item to ResolutionCode.
pub fn item_to_resolution_code(item: &Item) -> Result<ResolutionCode, RepositoryError> {
    Ok(ResolutionCode {
        id: get_number(item, keys::CODE_ID)?,
        text: get_string(item, keys::CODE_TEXT)?,
        note: get_optional_string(item, keys::CODE_NOTE),
    })
}

// ============================================================================
// Helper functions
// ============================================================================

fn invalid_field(key: &str) -> RepositoryError {
    RepositoryError::InvalidData(format!("Missing or invalid field: {key}"))
}

/// List of strings as an `L` attribute.
pub fn string_list(values: &[String]) -> AttributeValue {
    AttributeValue::L(values.iter().cloned().map(AttributeValue::S).collect())
}

/// Get a required string attribute.
pub fn get_string(item: &Item, key: &str) -> Result<String, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| invalid_field(key))
}

/// Get an optional string attribute.
pub fn get_optional_string(item: &Item, key: &str) -> Option<String> {
    item.get(key).and_then(|v| v.as_s().ok()).cloned()
}

/// Parse a number attribute's text into any integer type.
pub fn get_number<T: FromStr>(item: &Item, key: &str) -> Result<T, RepositoryError> {
    item.get(key)
        .and_then(|v| v.as_n().ok())
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| invalid_field(key))
}

fn get_optional_number<T: FromStr>(item: &Item, key: &str) -> Result<Option<T>, RepositoryError> {
    match item.get(key) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(_) => get_number(item, key).map(Some),
    }
}

/// Parse a number attribute exactly. DynamoDB may return exponent notation.
///
/// `Decimal` holds at most 28 significant digits while DynamoDB numbers hold
/// up to 38. A stored value beyond that range is `InvalidData`, logged with
/// the attribute name and raw text.
pub fn get_decimal(item: &Item, key: &str) -> Result<Decimal, RepositoryError> {
    let text = item
        .get(key)
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| invalid_field(key))?;

    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|err| {
            tracing::warn!(
                attribute = key,
                value = %text,
                error = %err,
                "Number not representable as a decimal"
            );
            invalid_field(key)
        })
}

fn get_optional_decimal(item: &Item, key: &str) -> Result<Option<Decimal>, RepositoryError> {
    match item.get(key) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(_) => get_decimal(item, key).map(Some),
    }
}

fn get_optional_map<'a>(item: &'a Item, key: &str) -> Result<Option<&'a Item>, RepositoryError> {
    match item.get(key) {
        None | Some(AttributeValue::Null(_)) => Ok(None),
        Some(value) => value.as_m().map(Some).map_err(|_| invalid_field(key)),
    }
}

/// Get a list of strings. A missing attribute is an empty list.
fn get_string_list(item: &Item, key: &str) -> Result<Vec<String>, RepositoryError> {
    let Some(value) = item.get(key) else {
        return Ok(Vec::new());
    };
    let list = value.as_l().map_err(|_| invalid_field(key))?;
    list.iter()
        .map(|v| v.as_s().cloned().map_err(|_| invalid_field(key)))
        .collect()
}
