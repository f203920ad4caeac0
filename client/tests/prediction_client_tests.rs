//! Prediction client tests against a local fake of the prediction service

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use bean_inspection_client::error::InspectionError;
use bean_inspection_client::external::PredictionClient;
use bean_inspection_client::services::InspectionService;
use bean_inspection_client::store::InMemoryStore;
use serde_json::{json, Value};
use shared::{SymptomReport, SymptomReportInput};

#[derive(Clone, Default)]
struct FakeService {
    requests: Arc<AtomicUsize>,
}

async fn predict_disease(State(fake): State<FakeService>, Json(body): Json<Value>) -> Json<Value> {
    fake.requests.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "defect_Name": {"prediction": "Leaf Rust", "probability": 0.91},
        "cause_condition": {"prediction": "High humidity"},
        "bean_Quality": {"prediction": "Fair", "probability": 0.67},
        "received": body
    }))
}

async fn predict_image(State(fake): State<FakeService>, mut multipart: Multipart) -> Json<Value> {
    fake.requests.fetch_add(1, Ordering::SeqCst);
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(str::to_string);
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let size = field.bytes().await.unwrap().len();
        parts.push(json!({
            "name": name,
            "fileName": file_name,
            "contentType": content_type,
            "size": size
        }));
    }
    Json(json!({
        "predicted_class": "Arabica",
        "is_coffee_bean": true,
        "bean_type_confidence": 0.88,
        "parts": parts
    }))
}

async fn unavailable() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded")
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(json!({}))
}

async fn not_json() -> &'static str {
    "<html>maintenance</html>"
}

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn healthy_service() -> (String, FakeService) {
    let fake = FakeService::default();
    let router = Router::new()
        .route("/predict_disease", post(predict_disease))
        .route("/predict_image", post(predict_image))
        .with_state(fake.clone());
    (spawn(router).await, fake)
}

fn client(base_url: &str) -> PredictionClient {
    PredictionClient::new(base_url, Duration::from_secs(5)).unwrap()
}

fn sample_report() -> SymptomReport {
    SymptomReport {
        symptoms: 3,
        category: 1,
        region: 2,
        dehydration_duration: 1,
        caught_rain_or_mist: 0,
    }
}

#[tokio::test]
async fn symptom_report_is_posted_as_json() {
    let (base_url, fake) = healthy_service().await;

    let result = client(&base_url)
        .submit_symptom_report(&sample_report())
        .await
        .unwrap();

    assert_eq!(fake.requests.load(Ordering::SeqCst), 1);
    let received = &result.0["received"];
    assert_eq!(received["symptoms_lable"], 3);
    assert_eq!(received["category"], 1);
    assert_eq!(received["region"], 2);
    assert_eq!(received["dehydration_Duration"], 1);
    assert_eq!(received["caught_Rain/Mist"], 0);

    let disease = result.disease();
    assert_eq!(
        disease.defect_name.unwrap().prediction.as_deref(),
        Some("Leaf Rust")
    );
}

#[tokio::test]
async fn image_is_uploaded_as_multipart_file() {
    let (base_url, _fake) = healthy_service().await;
    let dir = std::env::temp_dir().join(format!("bean-upload-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    let path = dir.join("capture.jpg");
    tokio::fs::write(&path, [0xFFu8, 0xD8, 0xFF, 0xE0, 0x00, 0x10]).await.unwrap();

    let result = client(&base_url).submit_image(&path).await.unwrap();
    let _ = tokio::fs::remove_dir_all(&dir).await;

    let parts = result.0["parts"].as_array().unwrap();
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0]["name"], "file");
    assert_eq!(parts[0]["fileName"], "photo.jpg");
    assert_eq!(parts[0]["contentType"], "image/jpeg");
    assert_eq!(parts[0]["size"], 6);
    assert_eq!(result.0["predicted_class"], "Arabica");
}

#[tokio::test]
async fn non_success_status_is_a_service_error() {
    let router = Router::new().route("/predict_disease", post(unavailable));
    let base_url = spawn(router).await;

    let err = client(&base_url)
        .submit_symptom_report(&sample_report())
        .await
        .unwrap_err();
    match err {
        InspectionError::Service { status_code, body } => {
            assert_eq!(status_code, 500);
            assert_eq!(body, "model not loaded");
        }
        other => panic!("expected service error, got {:?}", other),
    }
}

#[tokio::test]
async fn unparseable_body_is_an_invalid_response() {
    let router = Router::new().route("/predict_disease", post(not_json));
    let base_url = spawn(router).await;

    let err = client(&base_url)
        .submit_symptom_report(&sample_report())
        .await
        .unwrap_err();
    assert!(matches!(err, InspectionError::InvalidResponse(_)));
}

#[tokio::test]
async fn refused_connection_is_a_network_error() {
    // Bind then drop to find a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}", addr))
        .submit_symptom_report(&sample_report())
        .await
        .unwrap_err();
    assert!(matches!(err, InspectionError::Network(_)));
    assert!(err.notice().retryable);
}

#[tokio::test]
async fn slow_service_times_out() {
    let router = Router::new().route("/predict_disease", post(slow));
    let base_url = spawn(router).await;

    let client = PredictionClient::new(&base_url, Duration::from_millis(200)).unwrap();
    let err = client
        .submit_symptom_report(&sample_report())
        .await
        .unwrap_err();
    assert!(matches!(err, InspectionError::Timeout(_)));
}

#[tokio::test]
async fn incomplete_form_sends_nothing() {
    let (base_url, fake) = healthy_service().await;
    let service = InspectionService::new(client(&base_url), Arc::new(InMemoryStore::new()));

    let input = SymptomReportInput {
        symptoms: Some(3),
        category: Some(1),
        region: None,
        dehydration_duration: Some(1),
        caught_rain_or_mist: Some(0),
    };
    let err = service.submit_symptom_form(&input).await.unwrap_err();

    match err {
        InspectionError::Validation { field, .. } => assert_eq!(field, "region"),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(fake.requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn complete_form_is_submitted() {
    let (base_url, fake) = healthy_service().await;
    let service = InspectionService::new(client(&base_url), Arc::new(InMemoryStore::new()));

    let input = SymptomReportInput {
        symptoms: Some(0),
        category: Some(0),
        region: Some(0),
        dehydration_duration: Some(0),
        caught_rain_or_mist: Some(1),
    };
    let result = service.submit_symptom_form(&input).await.unwrap();
    assert_eq!(result.0["received"]["caught_Rain/Mist"], 1);
    assert_eq!(fake.requests.load(Ordering::SeqCst), 1);
}
