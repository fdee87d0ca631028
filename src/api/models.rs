use crate::config::StorageConfig;
use crate::storage::{DatasetHandle, StorageError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<DatasetHandle>,
    pub columns: Arc<ColumnSettings>,
}

/// Columns the dashboard endpoints aggregate and derive from
#[derive(Debug, Clone)]
pub struct ColumnSettings {
    pub category: String,
    pub value: String,
    pub preview_rows: usize,
    pub derived: String,
    pub derived_factor: f64,
}

impl From<&StorageConfig> for ColumnSettings {
    fn from(config: &StorageConfig) -> Self {
        Self {
            category: config.category_column.clone(),
            value: config.value_column.clone(),
            preview_rows: config.preview_rows,
            derived: config.derived_column.clone(),
            derived_factor: config.derived_factor,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Query for the rows preview
#[derive(Debug, Default, Deserialize)]
pub struct RowsQuery {
    /// Number of rows; 0 returns every row
    pub limit: Option<usize>,

    #[serde(default)]
    pub derived: bool,
}

/// Response after reloading the dataset
#[derive(Debug, Serialize, Deserialize)]
pub struct ReloadResponse {
    pub rows: usize,
    pub path: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    NotFound { message: String, path: String },
    Internal(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { ref path } => AppError::NotFound {
                path: path.display().to_string(),
                message: err.to_string(),
            },
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, path) = match self {
            AppError::NotFound { message, path } => (StatusCode::NOT_FOUND, message, Some(path)),
            AppError::Internal(msg) => {
                error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: status.to_string(),
                message,
                path,
            }),
        )
            .into_response()
    }
}
