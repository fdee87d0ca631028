pub mod dashboard;
pub mod item;
pub mod models;

// Re-exports
pub use models::*;

use axum::{routing::get, Json, Router};
use tower_http::trace::TraceLayer;

pub const SERVICE_NAME: &str = "Dashboard data service";

// Health handler (simple, keep here)
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Full router with all endpoints
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/health", get(health_handler))
        .merge(item::routes())
        .merge(dashboard::routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
