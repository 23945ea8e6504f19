use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::password;
use crate::state::AppState;
use fleetbook_core::TenantRole;
use fleetbook_store::{TenantRepository, UserRepository};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    pub name: Option<String>,
    pub domain: Option<String>,
    pub description: Option<String>,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateTenantResponse {
    message: String,
    tenant: TenantSummary,
}

#[derive(Debug, Serialize)]
struct TenantSummary {
    id: Uuid,
    name: String,
    domain: String,
}

#[derive(Debug, Serialize)]
struct TenantListItem {
    id: Uuid,
    name: String,
    domain: String,
    description: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/tenants", post(create_tenant).get(list_tenants))
}

/// POST /api/tenants — provision a tenant together with its first admin
/// user and membership, atomically.
async fn create_tenant(
    State(state): State<AppState>,
    Json(req): Json<CreateTenantRequest>,
) -> Result<(StatusCode, Json<CreateTenantResponse>), AppError> {
    let (name, domain, admin_email, admin_password) = match (
        req.name,
        req.domain,
        req.admin_email,
        req.admin_password,
    ) {
        (Some(n), Some(d), Some(e), Some(p)) => (n, d, e, p),
        _ => {
            return Err(AppError::ValidationError(
                "Missing required fields".to_string(),
            ))
        }
    };

    if TenantRepository::find_by_domain(&state.db.pool, &domain)
        .await?
        .is_some()
    {
        return Err(AppError::ValidationError(
            "Tenant domain already exists".to_string(),
        ));
    }

    let password_hash = password::hash_password(&admin_password)
        .map_err(|e| AppError::InternalServerError(format!("Password hashing failed: {e}")))?;

    let mut tx = state.db.pool.begin().await?;

    let tenant = TenantRepository::create(&mut tx, &domain, &name, req.description.as_deref())
        .await
        .map_err(|e| map_unique_violation(e, "Tenant domain already exists"))?;

    let admin = UserRepository::create(
        &mut tx,
        &admin_email,
        "Admin",
        &password_hash,
        TenantRole::Admin,
    )
    .await
    .map_err(|e| map_unique_violation(e, "Admin email already in use"))?;

    TenantRepository::add_membership(&mut tx, admin.id, tenant.id, TenantRole::Admin).await?;

    tx.commit().await?;

    tracing::info!(tenant = %tenant.domain, admin = %admin.email, "Tenant provisioned");

    Ok((
        StatusCode::CREATED,
        Json(CreateTenantResponse {
            message: "Tenant created successfully".to_string(),
            tenant: TenantSummary {
                id: tenant.id,
                name: tenant.name,
                domain: tenant.domain,
            },
        }),
    ))
}

fn map_unique_violation(e: sqlx::Error, message: &str) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23505") {
            return AppError::ValidationError(message.to_string());
        }
    }
    AppError::Anyhow(e.into())
}

/// GET /api/tenants
async fn list_tenants(
    State(state): State<AppState>,
) -> Result<Json<Vec<TenantListItem>>, AppError> {
    let tenants = TenantRepository::list(&state.db.pool).await?;

    Ok(Json(
        tenants
            .into_iter()
            .map(|t| TenantListItem {
                id: t.id,
                name: t.name,
                domain: t.domain,
                description: t.description,
            })
            .collect(),
    ))
}
