use crate::api::dashboard::handlers::{data_handler, reload_handler, rows_handler};
use crate::api::models::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/dashboard/data", get(data_handler))
        .route("/api/v1/dashboard/rows", get(rows_handler))
        .route("/api/v1/dashboard/reload", post(reload_handler))
}
