use crate::storage::Item;
use axum::{extract::Path, Json};
use tracing::info;

/// Unknown ids answer 200 with a placeholder record
pub async fn get_item_handler(Path(id): Path<i64>) -> Json<Item> {
    let item = Item::lookup(id);
    info!(id, found = !item.is_placeholder(), "Item lookup");
    Json(item)
}
