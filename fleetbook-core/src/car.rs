use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::booking::DateRange;

/// A rentable car, owned by exactly one tenant. `available` is a derived
/// flag mutated only by the booking flow, never set directly by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub license_plate: String,
    pub daily_rate_cents: i32,
    pub available: bool,
    pub created_at: DateTime<Utc>,
}

impl Car {
    /// Price of renting this car for the given period, in cents.
    /// The server-side figure is authoritative; client-supplied totals are
    /// display-only.
    pub fn rental_total_cents(&self, period: &DateRange) -> i32 {
        self.daily_rate_cents * period.days() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn camry(daily_rate_cents: i32) -> Car {
        Car {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            brand: "Toyota".to_string(),
            model: "Camry".to_string(),
            year: 2023,
            color: "Silver".to_string(),
            license_plate: "CITY-1234".to_string(),
            daily_rate_cents,
            available: true,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_rental_total_is_rate_times_days() {
        let car = camry(5000);
        let period = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 5).unwrap(),
        )
        .unwrap();
        assert_eq!(car.rental_total_cents(&period), 20000);
    }
}
