use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub car_id: Uuid,
    pub tenant_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price_cents: i32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Result<Self, BookingError> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "COMPLETED" => Ok(BookingStatus::Completed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            other => Err(BookingError::UnknownStatus(other.to_string())),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive rental period. Both endpoints are rental days, so
/// [2025-06-01, 2025-06-05] and [2025-06-05, 2025-06-08] collide on the 5th.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// A rental period must span at least one chargeable day (end > start).
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BookingError> {
        if end <= start {
            return Err(BookingError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Chargeable days: nights between start and end.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Closed-interval overlap: the ranges share at least one day.
    /// This is the general formula, so it also catches a range that
    /// strictly contains another without touching either endpoint.
    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("invalid rental period: end {end} must be after start {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("unknown booking status: {0}")]
    UnknownStatus(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn range(start: &str, end: &str) -> DateRange {
        DateRange::new(date(start), date(end)).unwrap()
    }

    #[test]
    fn test_rejects_inverted_and_zero_length_ranges() {
        assert!(DateRange::new(date("2025-06-05"), date("2025-06-01")).is_err());
        assert!(DateRange::new(date("2025-06-01"), date("2025-06-01")).is_err());
    }

    #[test]
    fn test_overlap_at_boundary() {
        let existing = range("2025-06-01", "2025-06-05");
        let requested = range("2025-06-04", "2025-06-10");
        assert!(existing.overlaps(&requested));
        assert!(requested.overlaps(&existing));

        // Sharing exactly the handover day still counts as overlap.
        let back_to_back = range("2025-06-05", "2025-06-08");
        assert!(existing.overlaps(&back_to_back));
    }

    #[test]
    fn test_overlap_when_requested_contains_existing() {
        // The endpoint-only formula inherited from the old code missed this
        // case; the general formula must catch it.
        let existing = range("2025-06-03", "2025-06-05");
        let requested = range("2025-06-01", "2025-06-10");
        assert!(requested.overlaps(&existing));
        assert!(existing.overlaps(&requested));
    }

    #[test]
    fn test_disjoint_ranges_do_not_overlap() {
        let first = range("2025-06-01", "2025-06-05");
        let later = range("2025-06-06", "2025-06-10");
        assert!(!first.overlaps(&later));
        assert!(!later.overlaps(&first));
    }

    #[test]
    fn test_chargeable_days() {
        assert_eq!(range("2025-06-01", "2025-06-05").days(), 4);
        assert_eq!(range("2025-06-01", "2025-06-02").days(), 1);
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(BookingStatus::parse("ON_HOLD").is_err());
    }
}
