use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use fleetbook_core::TenantRole;

/// Cookie the browser client stores the session token under; API callers
/// send the same token as a bearer header instead.
pub const SESSION_COOKIE: &str = "fleetbook_session";

// ============================================================================
// Session Claims
// ============================================================================

/// Claims embedded in the stateless session token. A session is valid only
/// within the tenant it was issued for. The shape is closed: decoding
/// validates `role` against the enum instead of trusting a free-form claim
/// bag, and claims are trusted without further lookups until expiry.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub tenant: Uuid,
    pub role: TenantRole,
    pub exp: usize,
}

pub fn issue_token(
    claims: &SessionClaims,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Decode and validate a session token. Invalid, expired or tampered tokens
/// all count as "no session".
pub fn decode_token(token: &str, secret: &str) -> Option<SessionClaims> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Session token from the Authorization header, falling back to the session
/// cookie.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(auth) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        if let Some(token) = auth.strip_prefix("Bearer ") {
            return Some(token.to_string());
        }
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
}

// ============================================================================
// Session Authentication Middleware
// ============================================================================

/// Requires a valid session and injects the claims into request extensions
/// for downstream handlers.
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = token_from_headers(req.headers())
        .and_then(|token| decode_token(&token, &state.auth.secret))
        .ok_or_else(|| AppError::AuthenticationError("Not authenticated".to_string()))?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const SECRET: &str = "test-secret";

    fn claims() -> SessionClaims {
        SessionClaims {
            sub: Uuid::new_v4(),
            email: "admin@city.com".to_string(),
            name: "Admin".to_string(),
            tenant: Uuid::new_v4(),
            role: TenantRole::Admin,
            exp: (Utc::now().timestamp() + 3600) as usize,
        }
    }

    #[test]
    fn test_token_roundtrip_preserves_claims() {
        let issued = claims();
        let token = issue_token(&issued, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();

        assert_eq!(decoded.sub, issued.sub);
        assert_eq!(decoded.tenant, issued.tenant);
        assert_eq!(decoded.role, TenantRole::Admin);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token(&claims(), SECRET).unwrap();
        assert!(decode_token(&token, "other-secret").is_none());
    }

    #[test]
    fn test_unknown_role_claim_is_rejected() {
        // A token carrying a role outside the enum must fail validation at
        // the decode boundary, not leak through as a string.
        #[derive(Serialize)]
        struct LooseClaims {
            sub: Uuid,
            email: String,
            name: String,
            tenant: Uuid,
            role: String,
            exp: usize,
        }

        let loose = LooseClaims {
            sub: Uuid::new_v4(),
            email: "admin@city.com".to_string(),
            name: "Admin".to_string(),
            tenant: Uuid::new_v4(),
            role: "SUPERUSER".to_string(),
            exp: (Utc::now().timestamp() + 3600) as usize,
        };

        let token = encode(
            &Header::default(),
            &loose,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(decode_token(&token, SECRET).is_none());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let mut expired = claims();
        expired.exp = (Utc::now().timestamp() - 3600) as usize;
        let token = issue_token(&expired, SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_none());
    }

    #[test]
    fn test_token_from_bearer_header_and_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer abc123".parse().unwrap());
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc123"));

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("{SESSION_COOKIE}=xyz789").parse().unwrap(),
        );
        assert_eq!(token_from_headers(&headers).as_deref(), Some("xyz789"));

        assert!(token_from_headers(&HeaderMap::new()).is_none());
    }
}
