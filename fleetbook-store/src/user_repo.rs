use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use fleetbook_core::{TenantRole, User};

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = sqlx::Error;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            role: parse_role(&row.role)?,
            created_at: row.created_at,
        })
    }
}

fn parse_role(s: &str) -> Result<TenantRole, sqlx::Error> {
    TenantRole::parse(s)
        .ok_or_else(|| sqlx::Error::Decode(format!("unknown tenant role: {s}").into()))
}

pub struct UserRepository;

impl UserRepository {
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, name, password_hash, role, created_at
            FROM users WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Role the user holds within the given tenant, if they are a member.
    pub async fn membership_role(
        pool: &PgPool,
        user_id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<TenantRole>, sqlx::Error> {
        let role: Option<(String,)> = sqlx::query_as(
            "SELECT role FROM tenant_members WHERE user_id = $1 AND tenant_id = $2",
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;

        role.map(|(r,)| parse_role(&r)).transpose()
    }

    pub async fn create(
        tx: &mut Transaction<'_, Postgres>,
        email: &str,
        name: &str,
        password_hash: &str,
        role: TenantRole,
    ) -> Result<User, sqlx::Error> {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            role,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&mut **tx)
        .await?;

        Ok(user)
    }
}
