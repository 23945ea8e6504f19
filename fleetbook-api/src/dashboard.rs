use axum::{
    extract::{Extension, Request, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::SessionClaims;
use crate::middleware::tenant::TenantContext;
use crate::state::AppState;
use fleetbook_store::{BookingDetails, BookingRepository, CarRepository};

#[derive(Debug, Serialize)]
struct DashboardResponse {
    tenant_id: Uuid,
    total_cars: i64,
    active_rentals: i64,
    total_customers: i64,
    revenue_cents: i64,
    recent_bookings: Vec<BookingDetails>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(overview))
}

/// GET /dashboard — the overview figures the dashboard renders. The tenant
/// gate guarantees a session exists here; the host's tenant context is
/// absent only on local-development hosts, where the session's tenant claim
/// scopes the view instead.
async fn overview(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    req: Request,
) -> Result<Json<DashboardResponse>, AppError> {
    let tenant_id = req
        .extensions()
        .get::<TenantContext>()
        .map(|ctx| ctx.id)
        .unwrap_or(claims.tenant);

    let total_cars = CarRepository::count_for_tenant(&state.db.pool, tenant_id).await?;
    let stats =
        BookingRepository::tenant_stats(&state.db.pool, tenant_id, Utc::now().date_naive())
            .await?;
    let recent_bookings = BookingRepository::recent_for_tenant(&state.db.pool, tenant_id, 5).await?;

    Ok(Json(DashboardResponse {
        tenant_id,
        total_cars,
        active_rentals: stats.active_rentals,
        total_customers: stats.total_customers,
        revenue_cents: stats.revenue_cents,
        recent_bookings,
    }))
}
