use chrono::NaiveDateTime;

use crate::grid::date_time_sort_key;

use super::RangeError;

/// An optionally bounded, inclusive timestamp range over load readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeRange {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl DateTimeRange {
    /// Creates a new range, validating that start <= end when both are set.
    pub fn new(
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Self, RangeError> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(RangeError::InvalidTimeRange);
            }
        }
        Ok(Self { start, end })
    }

    /// A range covering the whole partition.
    pub fn unbounded() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Lower sort-key bound, if any.
    pub fn start_key(&self) -> Option<String> {
        self.start.map(date_time_sort_key)
    }

    /// Upper sort-key bound, if any.
    pub fn end_key(&self) -> Option<String> {
        self.end.map(date_time_sort_key)
    }

    /// Whether a stored sort key falls inside the range, compared the way the
    /// store compares string sort keys.
    pub fn contains_key(&self, key: &str) -> bool {
        let after_start = self.start_key().is_none_or(|start| key >= start.as_str());
        let before_end = self.end_key().is_none_or(|end| key <= end.as_str());
        after_start && before_end
    }
}

/// An inclusive title range, compared byte-wise like a string sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleRange {
    pub low: String,
    pub high: String,
}

impl TitleRange {
    /// Creates a new range, validating that low <= high.
    pub fn new(low: impl Into<String>, high: impl Into<String>) -> Result<Self, RangeError> {
        let low = low.into();
        let high = high.into();
        if low > high {
            return Err(RangeError::InvalidTitleRange);
        }
        Ok(Self { low, high })
    }

    pub fn contains(&self, title: &str) -> bool {
        self.low.as_str() <= title && title <= self.high.as_str()
    }
}

/// Result of a conditional write.
///
/// A failed condition is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalOutcome<T> {
    /// The condition held and the write was applied.
    Applied(T),
    /// The item exists but the condition did not hold; nothing was written.
    ConditionFailed,
    /// No item exists under the key.
    NotFound,
}

impl<T> ConditionalOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, ConditionalOutcome::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            ConditionalOutcome::Applied(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ConditionalOutcome<U> {
        match self {
            ConditionalOutcome::Applied(value) => ConditionalOutcome::Applied(f(value)),
            ConditionalOutcome::ConditionFailed => ConditionalOutcome::ConditionFailed,
            ConditionalOutcome::NotFound => ConditionalOutcome::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 10, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_valid_time_range_construction() {
        let range = DateTimeRange::new(Some(ts(13, 0)), Some(ts(20, 0))).unwrap();

        assert_eq!(
            range.start_key().as_deref(),
            Some("2020-10-13 00:00:00.000000000")
        );
        assert_eq!(
            range.end_key().as_deref(),
            Some("2020-10-20 00:00:00.000000000")
        );
    }

    #[test]
    fn test_same_instant_range_is_valid() {
        assert!(DateTimeRange::new(Some(ts(13, 5)), Some(ts(13, 5))).is_ok());
    }

    #[test]
    fn test_reversed_time_range_returns_error() {
        assert_eq!(
            DateTimeRange::new(Some(ts(20, 0)), Some(ts(13, 0))),
            Err(RangeError::InvalidTimeRange)
        );
    }

    #[test]
    fn test_contains_key_inclusive_bounds() {
        let range = DateTimeRange::new(Some(ts(13, 0)), Some(ts(20, 0))).unwrap();

        assert!(range.contains_key("2020-10-13 00:00:00.000000000"));
        assert!(range.contains_key("2020-10-13 00:00:00.384259000"));
        assert!(range.contains_key("2020-10-20 00:00:00.000000000"));
        assert!(!range.contains_key("2020-10-20 00:00:00.384259000"));
        assert!(!range.contains_key("2020-10-12 23:45:00.000000000"));
    }

    #[test]
    fn test_contains_key_on_fractional_bounds() {
        let at = |d: u32, nanos: u32| {
            NaiveDate::from_ymd_opt(2020, 10, d)
                .unwrap()
                .and_hms_nano_opt(0, 0, 0, nanos)
                .unwrap()
        };
        let range = DateTimeRange::new(Some(at(13, 384_259_000)), Some(at(20, 384_259_000)))
            .unwrap();

        assert_eq!(
            range.end_key().as_deref(),
            Some("2020-10-20 00:00:00.384259000")
        );
        assert!(range.contains_key("2020-10-13 00:00:00.384259000"));
        assert!(range.contains_key("2020-10-20 00:00:00.384259000"));
        assert!(!range.contains_key("2020-10-20 00:00:00.384259001"));
        assert!(!range.contains_key("2020-10-13 00:00:00.384258999"));
    }

    #[test]
    fn test_unbounded_contains_everything() {
        assert!(DateTimeRange::unbounded().contains_key("0000"));
        assert!(DateTimeRange::unbounded().contains_key("9999-12-31 23:59:59"));
    }

    #[test]
    fn test_title_range_bounds() {
        let range = TitleRange::new("A", "Z").unwrap();

        assert!(range.contains("A"));
        assert!(range.contains("Rush"));
        assert!(range.contains("Z"));
        assert!(!range.contains("Zoolander"));
        assert!(!range.contains("after earth"));
    }

    #[test]
    fn test_reversed_title_range_returns_error() {
        assert_eq!(TitleRange::new("Z", "A"), Err(RangeError::InvalidTitleRange));
    }

    #[test]
    fn test_conditional_outcome_helpers() {
        let applied = ConditionalOutcome::Applied(3);
        assert!(applied.is_applied());
        assert_eq!(applied.map(|n| n * 2), ConditionalOutcome::Applied(6));

        let failed: ConditionalOutcome<i32> = ConditionalOutcome::ConditionFailed;
        assert!(!failed.is_applied());
        assert_eq!(failed.clone().applied(), None);
        assert_eq!(failed.map(|n| n * 2), ConditionalOutcome::ConditionFailed);
    }
}
