use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::tenant::TenantRole;

/// Account shared across tenants; the authoritative role for a given tenant
/// lives on the membership, not here.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: TenantRole,
    pub created_at: DateTime<Utc>,
}
