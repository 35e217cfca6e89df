//! Sort-key formatting for the grid tables.
//!
//! Pure functions; the same layouts are used by every storage backend so that
//! lexicographic sort-key order matches the order callers expect.

use chrono::NaiveDateTime;

/// Layout of the `DateTime` sort key in the load table.
///
/// Always nine fraction digits, matching the fixture files, so a bound
/// compares byte-wise against stored keys exactly as it does in time.
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

/// Render a timestamp as a load-table sort key.
pub fn date_time_sort_key(timestamp: NaiveDateTime) -> String {
    timestamp.format(DATE_TIME_FORMAT).to_string()
}

/// Composite zone key.
///
/// Pattern: `<id>_<country_fk>`
pub fn zone_composite_key(id: i64, country_fk: i64) -> String {
    format!("{id}_{country_fk}")
}

/// Prefix selecting every composite key of a zone.
///
/// Pattern: `<id>_`
///
/// The trailing separator keeps `42` from matching `420_…`.
pub fn zone_key_prefix(id: i64) -> String {
    format!("{id}_")
}
