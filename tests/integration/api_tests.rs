//! API integration tests

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_scheduler::{api::create_router, models::RecordStatus};

use crate::{at, friday_evening, monday, Harness};

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn register(app: &Router, identity: &str, name: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/v1/customers",
        Some(json!({ "identity": identity, "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let harness = Harness::new();
    let app = create_router(harness.app_state(friday_evening()));

    let (status, body) = send(&app, Method::GET, "/api/v1/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["state_file"], "unused.json");
    assert_eq!(body["sample_rate_minutes"], 30);
}

#[tokio::test]
async fn test_list_services() {
    let harness = Harness::new();
    let app = create_router(harness.app_state(friday_evening()));

    let (status, body) = send(&app, Method::GET, "/api/v1/services", None).await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Consultation", "Express"]);
}

#[tokio::test]
async fn test_schedule_defaults_to_next_open_day() {
    let harness = Harness::new();
    let app = create_router(harness.app_state(friday_evening()));

    let (status, body) = send(&app, Method::GET, "/api/v1/schedule", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["date"], "2024-01-15");
    assert_eq!(body["prev_date"], Value::Null);
    assert_eq!(body["next_date"], "2024-01-16");

    let periods = body["periods"].as_array().unwrap();
    assert_eq!(periods.len(), 3);
    assert_eq!(periods[1]["kind"], "busy");
    assert_eq!(periods[1]["title"], "Lunch");
    assert_eq!(periods[1]["period"]["start"], "12:30:00");
}

#[tokio::test]
async fn test_slots_for_service() {
    let harness = Harness::new();
    let app = create_router(harness.app_state(friday_evening()));

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/services/2/slots?date=2024-01-15",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let slots = body["slots"].as_array().unwrap();
    // 09:30-12:30 and 13:30-17:00 in half hours
    assert_eq!(slots.len(), 13);
    assert_eq!(slots[0]["start"], "09:30:00");
    assert_eq!(slots[6]["start"], "13:30:00");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/services/99/slots?date=2024-01-15",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_customer_lookup() {
    let harness = Harness::new();
    let app = create_router(harness.app_state(friday_evening()));

    let id = register(&app, "tg:42", "Alice").await;

    let (status, body) = send(&app, Method::GET, "/api/v1/customers?identity=tg:42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "Alice");

    let (status, _) = send(&app, Method::GET, "/api/v1/customers?identity=tg:43", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_book_then_cancel() {
    let harness = Harness::new();
    let app = create_router(harness.app_state(friday_evening()));
    let customer_id = register(&app, "tg:1", "Bob").await;

    let (status, record) = send(
        &app,
        Method::POST,
        "/api/v1/appointments",
        Some(json!({
            "customer_id": customer_id,
            "service_id": 1,
            "start": "2024-01-15T10:00:00"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(record["status"], "awaits");
    assert_eq!(record["period"]["end"], "2024-01-15T11:00:00");
    let record_id = record["id"].as_i64().unwrap();

    // Already known to change tracking
    let (status, events) = send(&app, Method::POST, "/api/v1/tracking/detect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events, json!([]));

    let uri = format!("/api/v1/customers/{}/appointment", customer_id);
    let (status, active) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(active["id"], record_id);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(harness.store.records().await.is_empty());

    let (status, events) = send(&app, Method::POST, "/api/v1/tracking/detect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events, json!([]));

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_booking_conflicts() {
    let harness = Harness::new();
    let app = create_router(harness.app_state(friday_evening()));
    let first = register(&app, "tg:1", "Bob").await;
    let second = register(&app, "tg:2", "Carol").await;

    let book = |customer_id: i64, start: &str| {
        json!({ "customer_id": customer_id, "service_id": 1, "start": start })
    };

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/appointments",
        Some(book(first, "2024-01-15T10:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/appointments",
        Some(book(second, "2024-01-15T10:30:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "DateTimePeriodIsOccupied");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/appointments",
        Some(book(first, "2024-01-15T14:00:00")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "AnotherAppointmentIsAlreadyScheduled");
}

#[tokio::test]
async fn test_cancel_after_visit_is_refused() {
    let harness = Harness::new();
    let app = create_router(harness.app_state(friday_evening()));
    let customer_id = register(&app, "tg:3", "Dan").await;

    let (_, record) = send(
        &app,
        Method::POST,
        "/api/v1/appointments",
        Some(json!({
            "customer_id": customer_id,
            "service_id": 2,
            "start": "2024-01-15T16:00:00"
        })),
    )
    .await;
    harness
        .store
        .set_record_status(record["id"].as_i64().unwrap(), RecordStatus::Done)
        .await
        .unwrap();

    let uri = format!("/api/v1/customers/{}/appointment", customer_id);
    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "InvalidAppointmentStatusForCancel");
}

#[tokio::test]
async fn test_detect_reports_external_changes() {
    let harness = Harness::new();
    let app = create_router(harness.app_state(at(monday(), 8, 0)));
    let customer_id = register(&app, "tg:4", "Eve").await;

    let (_, record) = send(
        &app,
        Method::POST,
        "/api/v1/appointments",
        Some(json!({
            "customer_id": customer_id,
            "service_id": 2,
            "start": "2024-01-15T09:30:00"
        })),
    )
    .await;
    let record_id = record["id"].as_i64().unwrap();

    harness
        .store
        .set_record_status(record_id, RecordStatus::NotAppear)
        .await
        .unwrap();

    let (status, events) = send(&app, Method::POST, "/api/v1/tracking/detect", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["type"], "status_changed");
    assert_eq!(events[0]["record"]["id"], record_id);
    assert_eq!(events[0]["record"]["status"], "not_appear");
}
