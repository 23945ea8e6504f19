use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use fleetbook_core::{Booking, BookingStatus, Car, DateRange};

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    car_id: Uuid,
    tenant_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_price_cents: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = sqlx::Error;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            car_id: row.car_id,
            tenant_id: row.tenant_id,
            start_date: row.start_date,
            end_date: row.end_date,
            total_price_cents: row.total_price_cents,
            status: parse_status(&row.status)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn parse_status(s: &str) -> Result<BookingStatus, sqlx::Error> {
    BookingStatus::parse(s).map_err(|e| sqlx::Error::Decode(e.to_string().into()))
}

/// A booking joined with the car and renter the original listing embedded.
#[derive(Debug, Serialize)]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub car_brand: String,
    pub car_model: String,
    pub car_license_plate: String,
    pub renter_name: String,
    pub renter_email: String,
}

#[derive(Debug, sqlx::FromRow)]
struct BookingDetailsRow {
    id: Uuid,
    user_id: Uuid,
    car_id: Uuid,
    tenant_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    total_price_cents: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    car_brand: String,
    car_model: String,
    car_license_plate: String,
    renter_name: String,
    renter_email: String,
}

impl TryFrom<BookingDetailsRow> for BookingDetails {
    type Error = sqlx::Error;

    fn try_from(row: BookingDetailsRow) -> Result<Self, Self::Error> {
        Ok(BookingDetails {
            booking: Booking {
                id: row.id,
                user_id: row.user_id,
                car_id: row.car_id,
                tenant_id: row.tenant_id,
                start_date: row.start_date,
                end_date: row.end_date,
                total_price_cents: row.total_price_cents,
                status: parse_status(&row.status)?,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            car_brand: row.car_brand,
            car_model: row.car_model,
            car_license_plate: row.car_license_plate,
            renter_name: row.renter_name,
            renter_email: row.renter_email,
        })
    }
}

const BOOKING_DETAILS_SELECT: &str = r#"
    SELECT b.id, b.user_id, b.car_id, b.tenant_id, b.start_date, b.end_date,
           b.total_price_cents, b.status, b.created_at, b.updated_at,
           c.brand AS car_brand, c.model AS car_model,
           c.license_plate AS car_license_plate,
           u.name AS renter_name, u.email AS renter_email
    FROM bookings b
    JOIN cars c ON c.id = b.car_id
    JOIN users u ON u.id = b.user_id
"#;

#[derive(Debug, Serialize)]
pub struct TenantBookingStats {
    pub active_rentals: i64,
    pub total_customers: i64,
    pub revenue_cents: i64,
}

pub struct BookingRepository;

impl BookingRepository {
    /// Id of any CONFIRMED booking for the car sharing at least one day with
    /// the requested period. Runs inside the reservation transaction, after
    /// the car row lock.
    pub async fn find_conflicting(
        tx: &mut Transaction<'_, Postgres>,
        car_id: Uuid,
        period: &DateRange,
    ) -> Result<Option<Uuid>, sqlx::Error> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id FROM bookings
            WHERE car_id = $1
              AND status = 'CONFIRMED'
              AND start_date <= $3
              AND end_date >= $2
            LIMIT 1
            "#,
        )
        .bind(car_id)
        .bind(period.start())
        .bind(period.end())
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(|(id,)| id))
    }

    pub async fn create_confirmed(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        car: &Car,
        period: &DateRange,
        total_price_cents: i32,
    ) -> Result<Booking, sqlx::Error> {
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            user_id,
            car_id: car.id,
            tenant_id: car.tenant_id,
            start_date: period.start(),
            end_date: period.end(),
            total_price_cents,
            status: BookingStatus::Confirmed,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO bookings
                (id, user_id, car_id, tenant_id, start_date, end_date,
                 total_price_cents, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.car_id)
        .bind(booking.tenant_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.total_price_cents)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(booking)
    }

    /// Bookings visible to a user: their own rentals, plus every booking
    /// under tenants they administer. Newest first.
    pub async fn list_visible_to(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<BookingDetails>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BookingDetailsRow>(&format!(
            r#"{BOOKING_DETAILS_SELECT}
            WHERE b.user_id = $1
               OR b.tenant_id IN (
                    SELECT m.tenant_id FROM tenant_members m
                    WHERE m.user_id = $1 AND m.role = 'ADMIN')
            ORDER BY b.created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(BookingDetails::try_from).collect()
    }

    pub async fn recent_for_tenant(
        pool: &PgPool,
        tenant_id: Uuid,
        limit: i64,
    ) -> Result<Vec<BookingDetails>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BookingDetailsRow>(&format!(
            "{BOOKING_DETAILS_SELECT} WHERE b.tenant_id = $1 ORDER BY b.created_at DESC LIMIT $2"
        ))
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(BookingDetails::try_from).collect()
    }

    pub async fn tenant_stats(
        pool: &PgPool,
        tenant_id: Uuid,
        today: NaiveDate,
    ) -> Result<TenantBookingStats, sqlx::Error> {
        let (active_rentals, total_customers, revenue_cents): (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'CONFIRMED' AND end_date >= $2),
                COUNT(DISTINCT user_id),
                COALESCE(SUM(total_price_cents) FILTER (WHERE status <> 'CANCELLED'), 0)
            FROM bookings
            WHERE tenant_id = $1
            "#,
        )
        .bind(tenant_id)
        .bind(today)
        .fetch_one(pool)
        .await?;

        Ok(TenantBookingStats {
            active_rentals,
            total_customers,
            revenue_cents,
        })
    }
}
