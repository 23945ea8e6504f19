use axum::{
    extract::{Extension, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{session_auth_middleware, SessionClaims};
use crate::state::AppState;
use fleetbook_core::{Booking, DateRange};
use fleetbook_store::{BookingDetails, BookingRepository, CarRepository};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub car_id: Option<Uuid>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Display-only figure from the client; the server recomputes the
    /// authoritative total from the car's daily rate.
    pub total_price: Option<i64>,
}

pub fn routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/bookings", post(create_booking).get(list_bookings))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            session_auth_middleware,
        ))
}

/// POST /api/bookings
///
/// Reserve-if-available is one serializable unit: the car row lock, the
/// overlap check, the booking insert and the availability flip all happen in
/// a single transaction, so two concurrent requests for the same car cannot
/// both pass the check before either commits.
async fn create_booking(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Json(req): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>), AppError> {
    let (car_id, start_date, end_date, claimed_total) =
        match (req.car_id, req.start_date, req.end_date, req.total_price) {
            (Some(c), Some(s), Some(e), Some(t)) => (c, s, e, t),
            _ => {
                return Err(AppError::ValidationError(
                    "Missing required fields".to_string(),
                ))
            }
        };

    // Inverted or zero-length periods never reach the availability check.
    let period = DateRange::new(start_date, end_date)
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let mut tx = state.db.pool.begin().await?;

    let car = CarRepository::find_for_update(&mut tx, car_id)
        .await?
        .ok_or_else(|| AppError::ValidationError("Invalid car".to_string()))?;

    if !car.available {
        return Err(AppError::ConflictError("Car is not available".to_string()));
    }

    if BookingRepository::find_conflicting(&mut tx, car.id, &period)
        .await?
        .is_some()
    {
        return Err(AppError::ConflictError(
            "Car is not available for selected dates".to_string(),
        ));
    }

    let total_price_cents = car.rental_total_cents(&period);
    if claimed_total != i64::from(total_price_cents) {
        tracing::warn!(
            car_id = %car.id,
            claimed = claimed_total,
            computed = total_price_cents,
            "Client-supplied total differs from server-side price; storing server value"
        );
    }

    let booking =
        BookingRepository::create_confirmed(&mut tx, claims.sub, &car, &period, total_price_cents)
            .await
            .map_err(map_reservation_error)?;

    CarRepository::mark_unavailable(&mut tx, car.id).await?;

    tx.commit().await?;

    tracing::info!(booking_id = %booking.id, car_id = %car.id, "Booking confirmed");

    Ok((StatusCode::CREATED, Json(booking)))
}

/// The exclusion constraint backs up the row lock at the store level;
/// surface a violation as the same conflict the in-transaction check
/// produces.
fn map_reservation_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().as_deref() == Some("23P01") {
            return AppError::ConflictError(
                "Car is not available for selected dates".to_string(),
            );
        }
    }
    AppError::Anyhow(e.into())
}

/// GET /api/bookings — the caller's own rentals plus, for tenant admins,
/// every booking under the tenants they administer.
async fn list_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<Json<Vec<BookingDetails>>, AppError> {
    let bookings = BookingRepository::list_visible_to(&state.db.pool, claims.sub).await?;
    Ok(Json(bookings))
}
