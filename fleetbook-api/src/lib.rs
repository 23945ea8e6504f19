use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod bookings;
pub mod cars;
pub mod dashboard;
pub mod error;
pub mod middleware;
pub mod password;
pub mod state;
pub mod tenants;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    let api = Router::new()
        .merge(auth::routes())
        .merge(cars::routes())
        .merge(tenants::routes())
        .merge(bookings::routes(state.clone()));

    // The tenant gate is layered last so it runs before everything else.
    Router::new()
        .nest("/api", api)
        .merge(dashboard::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::tenant::tenant_gate,
        ))
        .with_state(state)
}
