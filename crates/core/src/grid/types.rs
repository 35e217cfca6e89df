use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::keys::zone_composite_key;

/// A total-load reading for one zone at one instant.
///
/// `(zone_reference_id, date_time)` is the record key; the store keeps at
/// most one reading per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReading {
    pub zone_reference_id: i64,
    /// Sort key, `YYYY-MM-DD HH:MM:SS[.fffffffff]`.
    pub date_time: String,
    /// Exact decimal; serialized as a string.
    pub total_load_value: Decimal,
}

impl LoadReading {
    pub fn new(zone_reference_id: i64, date_time: impl Into<String>, total_load_value: Decimal) -> Self {
        Self {
            zone_reference_id,
            date_time: date_time.into(),
            total_load_value,
        }
    }
}

/// A geographic reference zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceZone {
    pub id: i64,
    #[serde(rename = "countryForeignKey")]
    pub country_fk: i64,
    /// `<id>_<country_fk>`, the table's sort key.
    pub composite_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added_on: Option<String>,
}

impl ReferenceZone {
    /// Creates a zone and derives its composite key.
    pub fn new(id: i64, country_fk: i64) -> Self {
        Self {
            id,
            country_fk,
            composite_key: zone_composite_key(id, country_fk),
            added_on: None,
        }
    }

    pub fn with_added_on(mut self, added_on: impl Into<String>) -> Self {
        self.added_on = Some(added_on.into());
        self
    }
}

/// A resolution code from the reference tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionCode {
    pub id: i64,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
