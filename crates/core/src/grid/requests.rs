//! Parsing of raw query-string parameters into typed query inputs.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::storage::DateTimeRange;

use super::RequestError;

/// Which end of a range a timestamp parameter describes.
///
/// A bare date expands to the first instant of the day for `Start` and the
/// last representable instant of the day for `End`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampBound {
    Start,
    End,
}

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Parse the required `zone` parameter.
pub fn parse_zone_id(raw: Option<&str>) -> Result<i64, RequestError> {
    let raw = non_empty(raw).ok_or(RequestError::MissingParameter("zone"))?;
    raw.parse().map_err(|_| RequestError::InvalidInteger {
        name: "zone",
        value: raw.to_string(),
    })
}

/// Parse an ISO-8601 date or timestamp.
///
/// Accepts `T` or space separators, an optional fraction, and RFC 3339
/// offsets (converted to UTC).
pub fn parse_timestamp(
    name: &'static str,
    raw: &str,
    bound: TimestampBound,
) -> Result<NaiveDateTime, RequestError> {
    let raw = raw.trim();

    if let Some(parsed) = TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Ok(parsed);
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(parsed.naive_utc());
    }

    let invalid = || RequestError::InvalidTimestamp {
        name,
        value: raw.to_string(),
    };

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?;
    let expanded = match bound {
        TimestampBound::Start => date.and_hms_opt(0, 0, 0),
        TimestampBound::End => date.and_hms_nano_opt(23, 59, 59, 999_999_999),
    };
    expanded.ok_or_else(invalid)
}

/// Parse the optional `from`/`to` pair into a validated range.
pub fn parse_time_range(
    from: Option<&str>,
    to: Option<&str>,
) -> Result<DateTimeRange, RequestError> {
    let start = non_empty(from)
        .map(|raw| parse_timestamp("from", raw, TimestampBound::Start))
        .transpose()?;
    let end = non_empty(to)
        .map(|raw| parse_timestamp("to", raw, TimestampBound::End))
        .transpose()?;

    Ok(DateTimeRange::new(start, end)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RangeError;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn test_parse_zone_id_valid() {
        assert_eq!(parse_zone_id(Some("42")), Ok(42));
        assert_eq!(parse_zone_id(Some(" 7 ")), Ok(7));
    }

    #[test]
    fn test_parse_zone_id_missing() {
        assert_eq!(
            parse_zone_id(None),
            Err(RequestError::MissingParameter("zone"))
        );
        assert_eq!(
            parse_zone_id(Some("  ")),
            Err(RequestError::MissingParameter("zone"))
        );
    }

    #[test]
    fn test_parse_zone_id_not_a_number() {
        assert_eq!(
            parse_zone_id(Some("forty-two")),
            Err(RequestError::InvalidInteger {
                name: "zone",
                value: "forty-two".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_timestamp_iso_and_space_separated() {
        let expected = ts(2020, 10, 13, 8, 30, 0);
        assert_eq!(
            parse_timestamp("from", "2020-10-13T08:30:00", TimestampBound::Start),
            Ok(expected)
        );
        assert_eq!(
            parse_timestamp("from", "2020-10-13 08:30:00", TimestampBound::Start),
            Ok(expected)
        );
        assert_eq!(
            parse_timestamp("from", "2020-10-13T08:30", TimestampBound::Start),
            Ok(expected)
        );
    }

    #[test]
    fn test_parse_timestamp_with_fraction() {
        let parsed =
            parse_timestamp("from", "2020-10-13 00:00:00.384259000", TimestampBound::Start)
                .unwrap();
        assert_eq!(parsed.and_utc().timestamp_subsec_nanos(), 384_259_000);
    }

    #[test]
    fn test_parse_timestamp_rfc3339_offset_converts_to_utc() {
        assert_eq!(
            parse_timestamp("from", "2020-10-13T10:00:00+02:00", TimestampBound::Start),
            Ok(ts(2020, 10, 13, 8, 0, 0))
        );
    }

    #[test]
    fn test_parse_timestamp_date_only_expands_by_bound() {
        let start = parse_timestamp("from", "2020-10-13", TimestampBound::Start).unwrap();
        let end = parse_timestamp("to", "2020-10-13", TimestampBound::End).unwrap();

        assert_eq!(start, ts(2020, 10, 13, 0, 0, 0));
        assert_eq!(end.date(), start.date());
        assert!(end > ts(2020, 10, 13, 23, 59, 59));
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(
            parse_timestamp("to", "yesterday", TimestampBound::End),
            Err(RequestError::InvalidTimestamp {
                name: "to",
                value: "yesterday".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_time_range_open_ended() {
        let range = parse_time_range(Some("2020-10-13"), None).unwrap();
        assert_eq!(range.start, Some(ts(2020, 10, 13, 0, 0, 0)));
        assert_eq!(range.end, None);

        let range = parse_time_range(Some(""), Some("")).unwrap();
        assert_eq!(range, DateTimeRange::unbounded());
    }

    #[test]
    fn test_parse_time_range_reversed() {
        assert_eq!(
            parse_time_range(Some("2020-10-20"), Some("2020-10-13")),
            Err(RequestError::Range(RangeError::InvalidTimeRange))
        );
    }
}
