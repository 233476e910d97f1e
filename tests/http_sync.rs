// HTTP surface tests for the sync API.
// Run with: cargo test --test http_sync

mod common;

use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use crm_erp_sync::create_app;
use crm_erp_sync::handlers::AppState;
use crm_erp_sync::repositories::InMemoryStore;

fn test_server() -> (Arc<InMemoryStore>, TestServer) {
    let (store, orchestrator) = common::memory_orchestrator();
    let server = TestServer::new(create_app(AppState::new(orchestrator))).unwrap();
    (store, server)
}

fn sample_batch() -> Value {
    json!({
        "companies": [
            { "accountId": "ACC-1", "accountName": "Acme GmbH", "syncFlag": true, "status": "active" }
        ],
        "contacts": [
            {
                "contactId": "CON-1",
                "accountId": "ACC-1",
                "firstName": "Jane",
                "lastName": "Doe",
                "email": "jane@acme.com",
                "syncFlag": true
            }
        ]
    })
}

#[tokio::test]
async fn test_health_check() {
    let (_store, server) = test_server();

    let response = server.get("/api/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_sync_plain_batch() {
    let (store, server) = test_server();

    let response = server.post("/api/sync").json(&sample_batch()).await;

    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["companies"]["inserted"], 1);
    assert_eq!(report["contacts"]["inserted"], 1);
    assert_eq!(report["contactsSkipped"], false);

    assert_eq!(store.customers().await[0].customer_id, 1_000_000);
    assert_eq!(store.customer_contacts().await[0].contact_person_id, 2_000_000);
}

#[tokio::test]
async fn test_sync_cloud_event_with_encoded_data() {
    let (store, server) = test_server();

    let event = json!({
        "specversion": "1.0",
        "type": "crm.sync.batch",
        "source": "/crm/export",
        "data": sample_batch().to_string()
    });
    let response = server.post("/api/sync").json(&event).await;

    response.assert_status_ok();
    assert_eq!(store.customers().await.len(), 1);
}

#[tokio::test]
async fn test_sync_reports_skipped_contacts() {
    let (store, server) = test_server();

    let batch = json!({
        "companies": [{ "accountId": "ACC-1" }],
        "contacts": [{ "contactId": "CON-1", "accountId": "ACC-1", "email": "jane@acme.com" }]
    });
    let response = server.post("/api/sync").json(&batch).await;

    response.assert_status_ok();
    let report: Value = response.json();
    assert_eq!(report["contactsSkipped"], true);
    assert!(report["contacts"].is_null());
    assert_eq!(report["companies"]["failed"][0]["error"], "Missing mandatory fields");
    assert!(store.contacts().await.is_empty());
}

#[tokio::test]
async fn test_sync_rejects_invalid_payload() {
    let (_store, server) = test_server();

    let response = server.post("/api/sync").text("not json at all").await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["error"], "Invalid sync payload");
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_sync_echoes_request_id() {
    let (_store, server) = test_server();

    let response = server.post("/api/sync").json(&json!({})).await;

    response.assert_status_ok();
    let request_id = response.header("x-request-id");
    assert!(uuid::Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_sync_reuses_caller_request_id() {
    let (_store, server) = test_server();
    let request_id = "6f1c2b9e-3d4a-4c5b-9e8f-0a1b2c3d4e5f";

    let response = server
        .post("/api/sync")
        .add_header(
            axum::http::HeaderName::from_static("x-request-id"),
            axum::http::HeaderValue::from_static(request_id),
        )
        .json(&json!({}))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("x-request-id"), request_id);
}

#[tokio::test]
async fn test_sync_configuration_error_is_500() {
    let store = Arc::new(InMemoryStore::new());
    let orchestrator = common::misconfigured_orchestrator(store, false);
    let server = TestServer::new(create_app(AppState::new(orchestrator))).unwrap();

    let response = server.post("/api/sync").json(&sample_batch()).await;

    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body["error"], "Sync service is misconfigured");
    assert_eq!(body["status"], 500);
}
