mod error;
mod keys;
mod requests;
mod types;

pub use error::RequestError;
pub use keys::{date_time_sort_key, zone_composite_key, zone_key_prefix, DATE_TIME_FORMAT};
pub use requests::{parse_time_range, parse_timestamp, parse_zone_id, TimestampBound};
pub use types::{LoadReading, ReferenceZone, ResolutionCode};
