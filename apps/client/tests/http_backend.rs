use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, Path};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use client::backend::{AnalysisRequest, Backend, HttpBackend};
use client::normalize::{list_items, normalize_cv, normalize_job};
use client::notifications::NotificationSettings;
use client::{ClientError, Config, NotificationCenter, Store};

async fn upload(mut multipart: Multipart) -> (StatusCode, Json<Value>) {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or_default().to_string();
            let size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            return (
                StatusCode::OK,
                Json(json!({
                    "success": true,
                    "cv_data": {
                        "id": 5,
                        "file_upload": {"original_filename": name, "file_size": size},
                        "parsed_data": {"contact_info": {"name": "Jane Doe"}}
                    }
                })),
            );
        }
    }
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"detail": "No file provided"})),
    )
}

async fn get_cv(Path(id): Path<String>) -> (StatusCode, Json<Value>) {
    if id == "404" {
        (StatusCode::NOT_FOUND, Json(json!({"detail": "CV not found"})))
    } else {
        (StatusCode::OK, Json(json!({"id": id, "filename": "legacy.pdf"})))
    }
}

fn mock_backend() -> Router {
    Router::new()
        .route(
            "/api/jobs",
            get(|| async {
                Json(json!({
                    "success": true,
                    "data": [{"id": 1, "job_data": {"job_title": "Rust Engineer"}}]
                }))
            }),
        )
        .route("/api/cv/upload", post(upload))
        .route("/api/cv/:id", get(get_cv))
        .route(
            "/api/cv/analyze",
            post(|Json(body): Json<Value>| async move { Json(json!({"data": {"echo": body}})) }),
        )
        .route(
            "/api/cv/validate-job-json",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({"error": {"message": "job_title is required"}})),
                )
            }),
        )
        .route(
            "/api/analysis/recent",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        )
        .route("/api/sample-job-descriptions", get(|| async { "not json" }))
        .route(
            "/api/templates/:name",
            get(|Path(name): Path<String>| async move { format!("<section>{name}</section>") }),
        )
}

async fn spawn_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, mock_backend()).await.unwrap();
    });
    format!("http://{addr}")
}

fn backend(base_url: &str) -> HttpBackend {
    HttpBackend::new(base_url, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_data_envelope_is_unwrapped() {
    let url = spawn_backend().await;
    let payload = backend(&url).list_jobs().await.unwrap();

    let jobs: Vec<_> = list_items(&payload, &["jobs"]).iter().map(normalize_job).collect();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].title, "Rust Engineer");
}

#[tokio::test]
async fn test_legacy_top_level_payload_passes_through() {
    let url = spawn_backend().await;
    let payload = backend(&url).get_cv("7").await.unwrap();
    assert_eq!(payload["id"], "7");
    assert_eq!(normalize_cv(&payload).filename, "legacy.pdf");
}

#[tokio::test]
async fn test_detail_message_is_extracted() {
    let url = spawn_backend().await;
    match backend(&url).get_cv("404").await {
        Err(ClientError::Backend { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message.as_deref(), Some("CV not found"));
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_nested_error_message_is_extracted() {
    let url = spawn_backend().await;
    let err = backend(&url)
        .validate_job_json(&json!({"company": "Acme"}))
        .await
        .unwrap_err();
    assert_eq!(err.message_or("Validation failed"), "job_title is required");
}

#[tokio::test]
async fn test_plain_text_error_has_no_message() {
    let url = spawn_backend().await;
    let err = backend(&url).recent_analyses(10).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Backend {
            status: 500,
            message: None
        }
    ));
    assert_eq!(err.message_or("Failed to load history"), "Failed to load history");
}

#[tokio::test]
async fn test_malformed_success_body() {
    let url = spawn_backend().await;
    let err = backend(&url).sample_jobs().await.unwrap_err();
    assert!(matches!(err, ClientError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_analysis_request_body() {
    let url = spawn_backend().await;
    let request = AnalysisRequest {
        cv_id: Some("5".to_string()),
        job_id: None,
        cv_data: json!({"skills": ["Rust"]}),
        job_description: json!({"job_title": "Rust Engineer"}),
        detailed: true,
    };
    let payload = backend(&url).analyze(&request).await.unwrap();
    let echo = &payload["echo"];
    assert_eq!(echo["cv_id"], "5");
    assert!(echo.get("job_id").is_none());
    assert_eq!(echo["detailed"], true);
    assert_eq!(echo["job_description"]["job_title"], "Rust Engineer");
}

#[tokio::test]
async fn test_fragment_returns_html() {
    let url = spawn_backend().await;
    let html = backend(&url).fragment("results").await.unwrap();
    assert_eq!(html, "<section>results</section>");
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = backend(&format!("http://{addr}")).list_jobs().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
    assert!(err.user_message().is_some());
}

#[tokio::test]
async fn test_store_uploads_through_http() {
    let url = spawn_backend().await;
    let config = Config {
        backend_url: url.clone(),
        ..Config::default()
    };
    let center = NotificationCenter::in_memory(NotificationSettings::default());
    let mut store = Store::new(config, Arc::new(backend(&url)), center);

    let mut file = tempfile::Builder::new()
        .prefix("jane")
        .suffix(".pdf")
        .tempfile()
        .unwrap();
    file.write_all(b"%PDF-1.4 test").unwrap();
    file.flush().unwrap();

    store.select_file(file.path()).unwrap();
    let cv = store.upload_cv().await.unwrap();

    assert_eq!(cv.id.as_deref(), Some("5"));
    assert_eq!(cv.file_size_bytes, Some(13));
    assert!(cv.display_name.starts_with("jane"));
    assert_eq!(cv.contact_name.as_deref(), Some("Jane Doe"));
    assert!(store.view().current_cv.is_some());
    assert!(!store.view().upload.is_busy());
}
