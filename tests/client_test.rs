mod common;

use axum::{http::StatusCode, routing::get, Json, Router};
use dashboard_service::client::{ClientError, DashboardClient};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(60);

async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client(addr: SocketAddr) -> DashboardClient {
    DashboardClient::new(&format!("http://{}", addr), WINDOW, Duration::from_secs(5)).unwrap()
}

/// Dashboard data route that counts how often it is hit
fn counting_app(hits: Arc<AtomicUsize>) -> Router {
    Router::new().route(
        "/api/v1/dashboard/data",
        get(move || {
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(json!({"A": 2, "B": 1}))
            }
        }),
    )
}

#[tokio::test]
async fn test_dashboard_data_is_cached_within_window() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn(counting_app(hits.clone())).await;
    let client = client(addr);
    let t0 = Instant::now();

    let (table, err) = client.fetch_dashboard_data_at(t0).await;
    assert!(err.is_none());
    assert_eq!(table.rows, vec![vec!["A", "2"], vec!["B", "1"]]);

    let (again, err) = client
        .fetch_dashboard_data_at(t0 + Duration::from_secs(30))
        .await;
    assert!(err.is_none());
    assert_eq!(again, table);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    client.fetch_dashboard_data_at(t0 + WINDOW).await;
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidate_forces_refetch() {
    let hits = Arc::new(AtomicUsize::new(0));
    let addr = spawn(counting_app(hits.clone())).await;
    let client = client(addr);
    let t0 = Instant::now();

    client.fetch_dashboard_data_at(t0).await;
    client.invalidate_cache().await;
    client.fetch_dashboard_data_at(t0).await;
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_fetch_against_real_service() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn(common::test_app(&common::write_sample(dir.path()))).await;
    let client = client(addr);

    let health = client.fetch_health().await.unwrap();
    assert_eq!(health.status, "ok");

    let item = client.fetch_item(2).await.unwrap();
    assert_eq!(item.name, "Stock Analysis");

    let missing = client.fetch_item(77).await.unwrap();
    assert_eq!(missing.id, 77);
    assert!(missing.is_placeholder());

    let (table, err) = client.fetch_dashboard_data().await;
    assert!(err.is_none());
    assert_eq!(table.total("count"), Some(3.0));

    let rows = client.fetch_dashboard_rows(Some(0), true).await.unwrap();
    assert_eq!(rows.rows.len(), 3);
    assert!(rows.columns.contains(&"fare_x10".to_string()));

    let reloaded = client.reload_dataset().await.unwrap();
    assert_eq!(reloaded.rows, 3);
}

#[tokio::test]
async fn test_missing_data_file_yields_empty_table_and_status() {
    let dir = tempfile::tempdir().unwrap();
    let addr = spawn(common::test_app(&dir.path().join("absent.csv"))).await;
    let client = client(addr);

    let (table, err) = client.fetch_dashboard_data().await;
    assert!(table.is_empty());
    let err = err.unwrap();
    assert_eq!(err.status_code().map(|s| s.as_u16()), Some(404));
    assert!(err.to_string().contains("absent.csv"));
}

#[tokio::test]
async fn test_item_error_status_is_surfaced() {
    let app = Router::new().route(
        "/api/v1/item/{id}",
        get(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "500 Internal Server Error", "message": "catalog offline"})),
            )
        }),
    );
    let addr = spawn(app).await;
    let client = client(addr);

    let err = client.fetch_item(1).await.unwrap_err();
    match &err {
        ClientError::Status { status, message } => {
            assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "catalog offline");
        }
        other => panic!("expected a status error, got {:?}", other),
    }
    assert_eq!(err.status_code().map(|s| s.as_u16()), Some(500));
}

#[tokio::test]
async fn test_connection_failure_is_reported() {
    // Grab a free port, then close it
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let client = client(addr);

    let err = client.fetch_item(1).await.unwrap_err();
    assert!(matches!(err, ClientError::Connection { .. }));
    assert!(err.to_string().contains("running"));

    let (table, err) = client.fetch_dashboard_data().await;
    assert!(table.is_empty());
    assert!(matches!(err, Some(ClientError::Connection { .. })));
}
