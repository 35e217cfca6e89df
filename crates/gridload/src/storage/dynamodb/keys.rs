//! DynamoDB attribute names and key construction.
//!
//! Pure functions building the key maps for each table. Attribute names match
//! the fixture files loaded by `cargo xtask dynamodb load`.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use super::store::Item;

// ============================================================================
// Movies
// ============================================================================

pub const MOVIE_YEAR: &str = "year";
pub const MOVIE_TITLE: &str = "title";
pub const MOVIE_INFO: &str = "info";

// ============================================================================
// ReferenceZones
// ============================================================================

pub const ZONE_ID: &str = "Id";
pub const ZONE_COMPOSITE_KEY: &str = "Id_CountryFK";
pub const ZONE_COUNTRY_FK: &str = "Country_FK";
pub const ZONE_ADDED_ON: &str = "AreaRefAddedOn";

// ============================================================================
// TotalLoadData
// ============================================================================

pub const LOAD_ZONE_REFERENCE: &str = "entsoeAreaReference_FK";
pub const LOAD_DATE_TIME: &str = "DateTime";
pub const LOAD_TOTAL_VALUE: &str = "TotalLoadValue";

// ============================================================================
// ResolutionCodes
// ============================================================================

pub const CODE_ID: &str = "Id";
pub const CODE_TEXT: &str = "ResolutionCodeText";
pub const CODE_NOTE: &str = "ResolutionCodeNote";

/// Numeric attribute value from anything with an exact decimal text form.
pub fn number(value: impl ToString) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

/// Full key of a movie item.
pub fn movie_key(title: &str, year: i32) -> Item {
    HashMap::from([
        (MOVIE_YEAR.to_string(), number(year)),
        (MOVIE_TITLE.to_string(), AttributeValue::S(title.to_string())),
    ])
}

/// Full key of a load reading item.
pub fn load_reading_key(zone_id: i64, date_time: &str) -> Item {
    HashMap::from([
        (LOAD_ZONE_REFERENCE.to_string(), number(zone_id)),
        (
            LOAD_DATE_TIME.to_string(),
            AttributeValue::S(date_time.to_string()),
        ),
    ])
}

/// Full key of a resolution code item.
pub fn resolution_code_key(id: i64) -> Item {
    HashMap::from([(CODE_ID.to_string(), number(id))])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_key_uses_number_and_string() {
        let key = movie_key("Rush", 2013);

        assert_eq!(key.get("year").unwrap().as_n().unwrap(), "2013");
        assert_eq!(key.get("title").unwrap().as_s().unwrap(), "Rush");
        assert_eq!(key.len(), 2);
    }

    #[test]
    fn test_load_reading_key() {
        let key = load_reading_key(42, "2020-10-13 00:00:00");

        assert_eq!(
            key.get("entsoeAreaReference_FK").unwrap().as_n().unwrap(),
            "42"
        );
        assert_eq!(
            key.get("DateTime").unwrap().as_s().unwrap(),
            "2020-10-13 00:00:00"
        );
    }

    #[test]
    fn test_resolution_code_key_is_partition_only() {
        let key = resolution_code_key(7);

        assert_eq!(key.len(), 1);
        assert_eq!(key.get("Id").unwrap().as_n().unwrap(), "7");
    }
}
