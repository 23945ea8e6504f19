use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use fleetbook_core::{Tenant, TenantRole};

#[derive(Debug, sqlx::FromRow)]
struct TenantRow {
    id: Uuid,
    domain: String,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            domain: row.domain,
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

pub struct TenantRepository;

impl TenantRepository {
    pub async fn find_by_domain(
        pool: &PgPool,
        domain: &str,
    ) -> Result<Option<Tenant>, sqlx::Error> {
        let row = sqlx::query_as::<_, TenantRow>(
            "SELECT id, domain, name, description, created_at FROM tenants WHERE domain = $1",
        )
        .bind(domain)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(Tenant::from))
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Tenant>, sqlx::Error> {
        let rows = sqlx::query_as::<_, TenantRow>(
            "SELECT id, domain, name, description, created_at FROM tenants ORDER BY name",
        )
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(Tenant::from).collect())
    }

    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        domain: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Tenant, sqlx::Error> {
        let tenant = Tenant {
            id: Uuid::new_v4(),
            domain: domain.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO tenants (id, domain, name, description, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(tenant.id)
        .bind(&tenant.domain)
        .bind(&tenant.name)
        .bind(&tenant.description)
        .bind(tenant.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(tenant)
    }

    pub async fn add_membership(
        tx: &mut Transaction<'_, Postgres>,
        user_id: Uuid,
        tenant_id: Uuid,
        role: TenantRole,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO tenant_members (user_id, tenant_id, role)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(tenant_id)
        .bind(role.as_str())
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}
