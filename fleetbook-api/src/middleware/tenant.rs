use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{decode_token, token_from_headers};
use crate::state::AppState;
use fleetbook_store::TenantRepository;

/// Tenant resolved from the request's host, available to downstream
/// handlers via request extensions.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub id: Uuid,
    pub domain: String,
}

/// Path prefixes that require a session.
const PROTECTED_PREFIXES: &[&str] = &["/dashboard"];

/// API routes perform their own session checks and static assets carry no
/// tenant state, so both skip tenant injection.
fn is_exempt_path(path: &str) -> bool {
    path.starts_with("/api") || path.starts_with("/static") || path.contains('.')
}

fn is_protected_path(path: &str) -> bool {
    PROTECTED_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

fn host_without_port(host: &str) -> &str {
    host.split(':').next().unwrap_or(host)
}

/// Bare local-development hosts bypass tenant isolation entirely. This is a
/// development convenience, not a production security boundary.
fn is_dev_host(host: &str) -> bool {
    matches!(host_without_port(host), "localhost" | "127.0.0.1")
}

/// Leftmost label of the host, the candidate tenant domain.
fn tenant_label(host: &str) -> Option<&str> {
    host_without_port(host)
        .split('.')
        .next()
        .filter(|label| !label.is_empty())
}

// ============================================================================
// Tenant Gate Middleware
// ============================================================================

/// Intercepts every inbound request: resolves the tenant from the host's
/// subdomain, enforces that sessions are only honored within the tenant they
/// were issued for, and sends unauthenticated visitors of protected pages to
/// the login form with the original path as the callback target.
pub async fn tenant_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path().to_string();

    if is_exempt_path(&path) {
        return Ok(next.run(req).await);
    }

    let session = token_from_headers(req.headers())
        .and_then(|token| decode_token(&token, &state.auth.secret));

    if is_protected_path(&path) && session.is_none() {
        let callback = urlencoding::encode(&path);
        let login_url = format!("/auth/login?callbackUrl={callback}");
        return Ok(Redirect::temporary(&login_url).into_response());
    }

    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default()
        .to_string();

    if is_dev_host(&host) {
        if let Some(claims) = session {
            req.extensions_mut().insert(claims);
        }
        return Ok(next.run(req).await);
    }

    let label = tenant_label(&host)
        .ok_or_else(|| AppError::NotFoundError("Tenant not found".to_string()))?;

    let tenant = TenantRepository::find_by_domain(&state.db.pool, label)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Tenant not found".to_string()))?;

    if let Some(claims) = session {
        // A session is only valid within the tenant it was issued for.
        if claims.tenant != tenant.id {
            tracing::warn!(
                session_tenant = %claims.tenant,
                request_tenant = %tenant.id,
                "Tenant mismatch: user does not have access to this tenant"
            );
            return Err(AppError::AuthorizationError(
                "User does not have access to this tenant".to_string(),
            ));
        }
        req.extensions_mut().insert(claims);
    }

    req.extensions_mut().insert(TenantContext {
        id: tenant.id,
        domain: tenant.domain,
    });

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subdomain_becomes_tenant_label() {
        assert_eq!(tenant_label("acme.example.com"), Some("acme"));
        assert_eq!(tenant_label("city.rentals.io:8080"), Some("city"));
        assert_eq!(tenant_label(""), None);
        assert_eq!(tenant_label(".example.com"), None);
    }

    #[test]
    fn test_dev_hosts_bypass_tenant_isolation() {
        assert!(is_dev_host("localhost"));
        assert!(is_dev_host("localhost:3000"));
        assert!(is_dev_host("127.0.0.1:8080"));
        assert!(!is_dev_host("acme.example.com"));
        // A subdomain of localhost is still tenant territory.
        assert!(!is_dev_host("acme.localhost"));
    }

    #[test]
    fn test_api_and_static_paths_are_exempt() {
        assert!(is_exempt_path("/api/bookings"));
        assert!(is_exempt_path("/static/logo.svg"));
        assert!(is_exempt_path("/favicon.ico"));
        assert!(!is_exempt_path("/dashboard"));
        assert!(!is_exempt_path("/"));
    }

    #[test]
    fn test_protected_prefixes() {
        assert!(is_protected_path("/dashboard"));
        assert!(is_protected_path("/dashboard/bookings"));
        assert!(!is_protected_path("/auth/login"));
    }
}
