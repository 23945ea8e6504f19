use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use fleetbook_core::{Car, Tenant};
use fleetbook_store::CarRepository;

#[derive(Debug, Serialize)]
struct CarResponse {
    #[serde(flatten)]
    car: Car,
    tenant: TenantSummary,
}

#[derive(Debug, Serialize)]
struct TenantSummary {
    id: Uuid,
    name: String,
    domain: String,
}

impl From<(Car, Tenant)> for CarResponse {
    fn from((car, tenant): (Car, Tenant)) -> Self {
        CarResponse {
            car,
            tenant: TenantSummary {
                id: tenant.id,
                name: tenant.name,
                domain: tenant.domain,
            },
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cars", get(list_cars))
        .route("/cars/{id}", get(get_car))
}

/// GET /api/cars — public catalog, each car with its owning tenant embedded.
async fn list_cars(State(state): State<AppState>) -> Result<Json<Vec<CarResponse>>, AppError> {
    let cars = CarRepository::list_with_tenant(&state.db.pool).await?;
    Ok(Json(cars.into_iter().map(CarResponse::from).collect()))
}

/// GET /api/cars/{id}
async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CarResponse>, AppError> {
    let car = CarRepository::find_with_tenant(&state.db.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFoundError("Car not found".to_string()))?;

    Ok(Json(CarResponse::from(car)))
}
