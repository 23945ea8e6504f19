use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{issue_token, SessionClaims};
use crate::password;
use crate::state::AppState;
use fleetbook_core::TenantRole;
use fleetbook_store::{TenantRepository, UserRepository};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub tenant: Option<String>,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user: IdentityResponse,
}

#[derive(Debug, Serialize)]
struct IdentityResponse {
    id: Uuid,
    email: String,
    name: String,
    tenant_id: Uuid,
    role: TenantRole,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/login", post(login))
}

/// Verify a (tenant, email, password) triple and issue a stateless signed
/// session token scoped to that tenant.
///
/// Failure messages deliberately distinguish the causes (missing tenant vs
/// missing user vs bad password); collapsing them into one generic message
/// is a hardening option, not the shipped behavior.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let (email, supplied_password, tenant_domain) = match (req.email, req.password, req.tenant) {
        (Some(e), Some(p), Some(t)) => (e, p, t),
        _ => return Err(AppError::ValidationError("Missing credentials".to_string())),
    };

    let tenant = TenantRepository::find_by_domain(&state.db.pool, &tenant_domain)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("Tenant not found".to_string()))?;

    let user = UserRepository::find_by_email(&state.db.pool, &email)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("User not found".to_string()))?;

    let role = UserRepository::membership_role(&state.db.pool, user.id, tenant.id)
        .await?
        .ok_or_else(|| {
            AppError::AuthenticationError("User not associated with this tenant".to_string())
        })?;

    let password_matches = password::verify_password(&supplied_password, &user.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;

    if !password_matches {
        return Err(AppError::AuthenticationError("Invalid password".to_string()));
    }

    let claims = SessionClaims {
        sub: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        tenant: tenant.id,
        role,
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = issue_token(&claims, &state.auth.secret)
        .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {e}")))?;

    tracing::info!(user_id = %user.id, tenant = %tenant.domain, "User logged in");

    Ok(Json(AuthResponse {
        token,
        user: IdentityResponse {
            id: user.id,
            email: user.email,
            name: user.name,
            tenant_id: tenant.id,
            role,
        },
    }))
}
