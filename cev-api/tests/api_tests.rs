//! Integration tests for cev-api endpoints
//!
//! Tests cover:
//! - Upload ingestion, validation failures and status mapping
//! - History retention (five newest, newest first)
//! - Report download and not-found handling
//! - Health endpoint
//!
//! Authentication is disabled here (see auth_tests.rs).

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use cev_api::{build_router, AppState};
use cev_common::db::init_database;
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const BOUNDARY: &str = "cev-test-boundary";
const HEADER: &str = "Equipment Name,Type,Flowrate,Pressure,Temperature\n";

/// Test helper: app over a fresh database (auth disabled)
async fn setup_app() -> (TempDir, Router) {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("cev.db"))
        .await
        .expect("Should create test database");
    (dir, build_router(AppState::new(pool, false)))
}

/// Test helper: multipart upload request
fn upload_request(field: &str, filename: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: text/csv\r\n\r\n{content}\r\n--{b}--\r\n",
        b = BOUNDARY,
        field = field,
        filename = filename,
        content = content,
    );

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn upload(app: &Router, filename: &str, content: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(upload_request("csv_file", filename, content))
        .await
        .unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, app) = setup_app().await;

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "cev-api");
    assert!(body["version"].is_string());
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_upload_three_rows() {
    let (_dir, app) = setup_app().await;
    let csv = format!(
        "{}Pump A,Centrifugal,100,50,25\nPump B,Centrifugal,80,40,20\nValve C,Ball,10,5,2\n",
        HEADER
    );

    let (status, body) = upload(&app, "plant.csv", &csv).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "CSV uploaded successfully");

    let data = &body["data"];
    assert!(data["id"].is_i64());
    assert_eq!(data["filename"], "plant.csv");
    assert!(data["uploaded_at"].is_string());
    assert_eq!(data["equipment_count"], 3);
    let avg = data["avg_flowrate"].as_f64().unwrap();
    assert!((avg - 63.33).abs() < 0.01);
    assert_eq!(data["type_distribution"]["Centrifugal"], 2);
    assert_eq!(data["type_distribution"]["Ball"], 1);
}

#[tokio::test]
async fn test_upload_missing_column() {
    let (_dir, app) = setup_app().await;

    let (status, body) = upload(
        &app,
        "partial.csv",
        "Equipment Name,Type,Flowrate,Pressure\nPump A,Centrifugal,100,50\n",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing columns: Temperature");
    assert_eq!(body["missing_columns"], serde_json::json!(["Temperature"]));
    assert_eq!(body["required_columns"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_upload_all_rows_invalid() {
    let (_dir, app) = setup_app().await;
    let csv = format!("{}Pump A,Centrifugal,fast,50,25\n", HEADER);

    let (status, body) = upload(&app, "bad.csv", &csv).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No valid data found in CSV");
}

#[tokio::test]
async fn test_upload_rejects_non_csv_filename() {
    let (_dir, app) = setup_app().await;
    let csv = format!("{}Pump A,Centrifugal,1,2,3\n", HEADER);

    let (status, body) = upload(&app, "plant.txt", &csv).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "File must be a CSV file.");
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let (_dir, app) = setup_app().await;

    let response = app
        .oneshot(upload_request("other_field", "plant.csv", "x"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "No file was submitted.");
}

#[tokio::test]
async fn test_upload_non_multipart_body() {
    let (_dir, app) = setup_app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert!(body["error"].is_string());
}

// =============================================================================
// History
// =============================================================================

#[tokio::test]
async fn test_history_keeps_five_newest() {
    let (_dir, app) = setup_app().await;
    let csv = format!("{}Pump A,Centrifugal,1,2,3\n", HEADER);

    for i in 1..=7 {
        let (status, _) = upload(&app, &format!("upload{}.csv", i), &csv).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let response = app.oneshot(get_request("/api/history")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 5);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["filename"].as_str().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "upload7.csv",
            "upload6.csv",
            "upload5.csv",
            "upload4.csv",
            "upload3.csv"
        ]
    );
}

#[tokio::test]
async fn test_history_empty_and_trailing_slash() {
    let (_dir, app) = setup_app().await;

    let response = app.oneshot(get_request("/api/history/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["data"], serde_json::json!([]));
}

// =============================================================================
// Report
// =============================================================================

#[tokio::test]
async fn test_report_for_unknown_id() {
    let (_dir, app) = setup_app().await;
    let csv = format!("{}Pump A,Centrifugal,1,2,3\n", HEADER);
    upload(&app, "plant.csv", &csv).await;

    let response = app
        .oneshot(get_request("/api/report?upload_id=99999"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "Upload with ID 99999 not found.");
}

#[tokio::test]
async fn test_report_without_uploads() {
    let (_dir, app) = setup_app().await;

    let response = app.oneshot(get_request("/api/report")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"], "No uploads found. Please upload a CSV file first.");
}

#[tokio::test]
async fn test_report_invalid_id() {
    let (_dir, app) = setup_app().await;

    let response = app
        .oneshot(get_request("/api/report?upload_id=abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_report_defaults_to_latest() {
    let (_dir, app) = setup_app().await;
    let csv = format!("{}Pump A,Centrifugal,1,2,3\n", HEADER);
    upload(&app, "first.csv", &csv).await;
    let (_, body) = upload(&app, "second.csv", &csv).await;
    let latest_id = body["data"]["id"].as_i64().unwrap();

    let response = app.oneshot(get_request("/api/report")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"equipment_report_{}.pdf\"", latest_id).as_str()
    );

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_report_for_specific_id() {
    let (_dir, app) = setup_app().await;
    let csv = format!("{}Pump A,Centrifugal,1,2,3\n", HEADER);
    let (_, body) = upload(&app, "first.csv", &csv).await;
    let first_id = body["data"]["id"].as_i64().unwrap();
    upload(&app, "second.csv", &csv).await;

    let response = app
        .oneshot(get_request(&format!("/api/report/?upload_id={}", first_id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        format!("attachment; filename=\"equipment_report_{}.pdf\"", first_id).as_str()
    );
}
