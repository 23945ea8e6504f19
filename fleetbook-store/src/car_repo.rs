use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use fleetbook_core::{Car, Tenant};

#[derive(Debug, sqlx::FromRow)]
struct CarRow {
    id: Uuid,
    tenant_id: Uuid,
    brand: String,
    model: String,
    year: i32,
    color: String,
    license_plate: String,
    daily_rate_cents: i32,
    available: bool,
    created_at: DateTime<Utc>,
}

impl From<CarRow> for Car {
    fn from(row: CarRow) -> Self {
        Car {
            id: row.id,
            tenant_id: row.tenant_id,
            brand: row.brand,
            model: row.model,
            year: row.year,
            color: row.color,
            license_plate: row.license_plate,
            daily_rate_cents: row.daily_rate_cents,
            available: row.available,
            created_at: row.created_at,
        }
    }
}

// Car columns joined with the owning tenant's columns.
#[derive(Debug, sqlx::FromRow)]
struct CarTenantRow {
    id: Uuid,
    tenant_id: Uuid,
    brand: String,
    model: String,
    year: i32,
    color: String,
    license_plate: String,
    daily_rate_cents: i32,
    available: bool,
    created_at: DateTime<Utc>,
    tenant_domain: String,
    tenant_name: String,
    tenant_description: Option<String>,
    tenant_created_at: DateTime<Utc>,
}

impl From<CarTenantRow> for (Car, Tenant) {
    fn from(row: CarTenantRow) -> Self {
        let tenant = Tenant {
            id: row.tenant_id,
            domain: row.tenant_domain,
            name: row.tenant_name,
            description: row.tenant_description,
            created_at: row.tenant_created_at,
        };
        let car = Car {
            id: row.id,
            tenant_id: row.tenant_id,
            brand: row.brand,
            model: row.model,
            year: row.year,
            color: row.color,
            license_plate: row.license_plate,
            daily_rate_cents: row.daily_rate_cents,
            available: row.available,
            created_at: row.created_at,
        };
        (car, tenant)
    }
}

const CAR_TENANT_SELECT: &str = r#"
    SELECT c.id, c.tenant_id, c.brand, c.model, c.year, c.color,
           c.license_plate, c.daily_rate_cents, c.available, c.created_at,
           t.domain AS tenant_domain, t.name AS tenant_name,
           t.description AS tenant_description, t.created_at AS tenant_created_at
    FROM cars c
    JOIN tenants t ON t.id = c.tenant_id
"#;

pub struct CarRepository;

impl CarRepository {
    pub async fn list_with_tenant(pool: &PgPool) -> Result<Vec<(Car, Tenant)>, sqlx::Error> {
        let rows = sqlx::query_as::<_, CarTenantRow>(&format!(
            "{CAR_TENANT_SELECT} ORDER BY c.brand, c.model"
        ))
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn find_with_tenant(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<(Car, Tenant)>, sqlx::Error> {
        let row = sqlx::query_as::<_, CarTenantRow>(&format!("{CAR_TENANT_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(Into::into))
    }

    /// Load the car and take a row-level lock on it for the lifetime of the
    /// transaction. The availability check and the reservation write that
    /// follow must happen under this lock so that two concurrent bookings
    /// cannot both pass the check before either commits.
    pub async fn find_for_update(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Car>, sqlx::Error> {
        let row = sqlx::query_as::<_, CarRow>(
            r#"
            SELECT id, tenant_id, brand, model, year, color, license_plate,
                   daily_rate_cents, available, created_at
            FROM cars WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(Car::from))
    }

    pub async fn mark_unavailable(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE cars SET available = FALSE WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub async fn count_for_tenant(pool: &PgPool, tenant_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cars WHERE tenant_id = $1")
            .bind(tenant_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
