use axum::Router;
use dashboard_service::api::{self, AppState, ColumnSettings};
use dashboard_service::config::StorageConfig;
use dashboard_service::storage::{DatasetHandle, TableSource};
use std::path::Path;
use std::sync::Arc;

pub const SAMPLE_CSV: &str = "\
transaction_id;branch;fare_charged
1;A;1
2;A;2
3;B;3
";

pub fn write_sample(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("transactions.csv");
    std::fs::write(&path, SAMPLE_CSV).unwrap();
    path
}

pub fn test_state(data_path: &Path) -> AppState {
    let storage = StorageConfig {
        data_path: data_path.to_path_buf(),
        derived_column: "fare_x10".to_string(),
        derived_factor: 10.0,
        preview_rows: 2,
        ..StorageConfig::default()
    };

    AppState {
        dataset: Arc::new(DatasetHandle::new(TableSource::new(
            storage.data_path.clone(),
            storage.delimiter_byte().unwrap(),
        ))),
        columns: Arc::new(ColumnSettings::from(&storage)),
    }
}

pub fn test_app(data_path: &Path) -> Router {
    api::router(test_state(data_path))
}
