use crate::api::item::handlers::get_item_handler;
use crate::api::models::AppState;
use axum::{routing::get, Router};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/item/{id}", get(get_item_handler))
}
