use crate::api::models::*;
use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::info;

/// Category -> count of non-null values
pub async fn data_handler(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, u64>>, AppError> {
    let table = state.dataset.get().await?;
    let cols = &state.columns;

    let counts = table.group_count(&cols.category, &cols.value)?;

    info!(
        category = %cols.category,
        groups = counts.len(),
        rows = table.len(),
        "Aggregated dashboard data"
    );

    Ok(Json(counts))
}

/// First rows of the table, optionally with the derived column
pub async fn rows_handler(
    State(state): State<AppState>,
    Query(query): Query<RowsQuery>,
) -> Result<Json<Vec<Map<String, Value>>>, AppError> {
    let table = state.dataset.get().await?;
    let cols = &state.columns;

    let limit = match query.limit.unwrap_or(cols.preview_rows) {
        0 => None,
        n => Some(n),
    };

    let rows = if query.derived {
        table.records_with_derived(limit, &cols.value, &cols.derived, cols.derived_factor)?
    } else {
        table.records(limit)
    };

    info!(returned = rows.len(), derived = query.derived, "Dashboard rows");

    Ok(Json(rows))
}

pub async fn reload_handler(
    State(state): State<AppState>,
) -> Result<Json<ReloadResponse>, AppError> {
    let rows = state.dataset.reload().await?;

    Ok(Json(ReloadResponse {
        rows,
        path: state.dataset.path().display().to_string(),
    }))
}
