//! Seed the development database with two demo agencies, their admins and a
//! couple of cars each. Safe to run repeatedly.

use fleetbook_api::password;
use fleetbook_store::{app_config::Config, DbClient};
use uuid::Uuid;

const DEMO_TENANTS: &[(&str, &str, &str)] = &[
    (
        "Premium Cars",
        "premium",
        "Luxury car rentals for special occasions",
    ),
    ("City Rentals", "city", "Affordable city cars for daily use"),
];

const DEMO_CARS: &[(&str, &str, &str, &str, i32)] = &[
    ("Toyota", "Camry", "Silver", "1234", 5000),
    ("Honda", "Civic", "Black", "5678", 4500),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load()?;
    let db = DbClient::new(&config.database.url, config.database.max_connections).await?;
    db.migrate().await?;

    for &(name, domain, description) in DEMO_TENANTS {
        let tenant_id = upsert_tenant(&db, name, domain, description).await?;

        let admin_email = format!("admin@{domain}.com");
        let admin_id = upsert_admin(&db, &admin_email).await?;

        sqlx::query(
            r#"
            INSERT INTO tenant_members (user_id, tenant_id, role)
            VALUES ($1, $2, 'ADMIN')
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(admin_id)
        .bind(tenant_id)
        .execute(&db.pool)
        .await?;

        for &(brand, model, color, plate_suffix, daily_rate_cents) in DEMO_CARS {
            let license_plate = format!("{}-{}", domain.to_uppercase(), plate_suffix);
            sqlx::query(
                r#"
                INSERT INTO cars
                    (id, tenant_id, brand, model, year, color, license_plate, daily_rate_cents)
                VALUES ($1, $2, $3, $4, 2023, $5, $6, $7)
                ON CONFLICT (license_plate) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(tenant_id)
            .bind(brand)
            .bind(model)
            .bind(color)
            .bind(&license_plate)
            .bind(daily_rate_cents)
            .execute(&db.pool)
            .await?;
        }

        tracing::info!("Seeded tenant {name} with admin {admin_email}");
    }

    tracing::info!("Seeding completed successfully");
    Ok(())
}

async fn upsert_tenant(
    db: &DbClient,
    name: &str,
    domain: &str,
    description: &str,
) -> anyhow::Result<Uuid> {
    if let Some((id,)) = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM tenants WHERE domain = $1")
        .bind(domain)
        .fetch_optional(&db.pool)
        .await?
    {
        return Ok(id);
    }

    let id = Uuid::new_v4();
    sqlx::query("INSERT INTO tenants (id, domain, name, description) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(domain)
        .bind(name)
        .bind(description)
        .execute(&db.pool)
        .await?;

    Ok(id)
}

async fn upsert_admin(db: &DbClient, email: &str) -> anyhow::Result<Uuid> {
    if let Some((id,)) = sqlx::query_as::<_, (Uuid,)>("SELECT id FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(&db.pool)
        .await?
    {
        return Ok(id);
    }

    let password_hash = password::hash_password("admin123")
        .map_err(|e| anyhow::anyhow!("Password hashing failed: {e}"))?;

    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO users (id, email, name, password_hash, role)
        VALUES ($1, $2, 'Admin', $3, 'ADMIN')
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(&password_hash)
    .execute(&db.pool)
    .await?;

    Ok(id)
}
