//! Integration tests for the HTTP API.
//!
//! Requests go through the full axum router over an in-memory store, so
//! these cover routing, caller extraction, DTO mapping and status codes.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;

use tutor_scheduler::adapters::http::{api_router, middleware::CALLER_HEADER};
use tutor_scheduler::adapters::memory::InMemorySchedulingStore;
use tutor_scheduler::adapters::FixedClock;
use tutor_scheduler::application::SchedulingEngine;
use tutor_scheduler::domain::account::{Student, Tutor};
use tutor_scheduler::domain::foundation::{StudentId, TutorId};
use tutor_scheduler::domain::scheduling::SchedulingPolicy;

// =============================================================================
// Test Infrastructure
// =============================================================================

const TUTOR: &str = "ttr_001";
const OTHER_TUTOR: &str = "ttr_002";
const ALICE: &str = "st_001";
const BOB: &str = "st_002";

async fn app() -> Router {
    let store = Arc::new(InMemorySchedulingStore::new());
    for (id, name) in [(ALICE, "Alice"), (BOB, "Bob")] {
        store
            .seed_student(Student {
                id: StudentId::new(id).unwrap(),
                name: name.into(),
                email: format!("{}@example.com", name.to_lowercase()),
            })
            .await
            .unwrap();
    }
    for (id, name) in [(TUTOR, "Ms Rivera"), (OTHER_TUTOR, "Mr Okafor")] {
        store
            .seed_tutor(Tutor {
                id: TutorId::new(id).unwrap(),
                name: name.into(),
                email: format!("{}@school.example", id),
            })
            .await
            .unwrap();
    }
    let engine = SchedulingEngine::new(
        store.clone(),
        store,
        Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2026, 11, 2).unwrap())),
        SchedulingPolicy::default(),
    );
    api_router(Arc::new(engine))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    caller: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header(CALLER_HEADER, caller);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn session_body(start: &str, minutes: u32) -> Value {
    json!({
        "subject": "Math",
        "topic": "Algebra",
        "level": "Beginner",
        "date": "2026-11-09",
        "start_time": start,
        "duration_minutes": minutes,
        "mode": "In-person",
        "location": "Room 12"
    })
}

async fn post_session(app: &Router, start: &str, minutes: u32) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/sessions",
        Some(TUTOR),
        Some(session_body(start, minutes)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["session"]["id"].as_str().unwrap().to_string()
}

// =============================================================================
// Caller identity
// =============================================================================

#[tokio::test]
async fn health_needs_no_caller() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn missing_caller_is_unauthorized() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/sessions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn student_cannot_post_sessions() {
    let app = app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/sessions",
        Some(ALICE),
        Some(session_body("10:00:00", 60)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Sessions
// =============================================================================

#[tokio::test]
async fn posted_session_is_listed_with_tutor_name() {
    let app = app().await;
    let id = post_session(&app, "10:00:00", 60).await;
    assert_eq!(id, "sess_001");

    let (status, body) = send(&app, Method::GET, "/api/sessions", Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
    let listings = body.as_array().unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0]["tutor_name"], "Ms Rivera");
    assert_eq!(listings[0]["end_time"], "11:00:00");
    assert_eq!(listings[0]["mode"], "In-person");
    assert_eq!(listings[0]["active_registrations"], 0);
}

#[tokio::test]
async fn overlapping_session_returns_409_with_conflicts() {
    let app = app().await;
    post_session(&app, "10:00:00", 60).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/sessions",
        Some(TUTOR),
        Some(session_body("10:30:00", 30)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["details"]["conflicts"][0]["session_id"], "sess_001");

    let mut forced = session_body("10:30:00", 30);
    forced["override"] = json!(true);
    let (status, body) = send(&app, Method::POST, "/api/sessions", Some(TUTOR), Some(forced)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["overridden"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn patch_returns_audit_rows_and_history_lists_them() {
    let app = app().await;
    let id = post_session(&app, "10:00:00", 60).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/sessions/{id}"),
        Some(TUTOR),
        Some(json!({ "start_time": "13:00:00" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["session"]["end_time"], "14:00:00");

    let (status, history) = send(
        &app,
        Method::GET,
        &format!("/api/sessions/{id}/history"),
        Some(ALICE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let start = history
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["field"] == "start_time")
        .unwrap();
    assert_eq!(start["old_value"], "10:00");
    assert_eq!(start["new_value"], "13:00");
}

#[tokio::test]
async fn other_tutor_gets_403_on_patch() {
    let app = app().await;
    let id = post_session(&app, "10:00:00", 60).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/sessions/{id}"),
        Some(OTHER_TUTOR),
        Some(json!({ "topic": "Geometry" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
}

#[tokio::test]
async fn malformed_and_unknown_ids() {
    let app = app().await;
    let (status, _) = send(&app, Method::GET, "/api/sessions/abc", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::GET, "/api/sessions/sess_099", Some(ALICE), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancelled_session_disappears_from_listing() {
    let app = app().await;
    let id = post_session(&app, "10:00:00", 60).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/sessions/{id}/cancel"),
        Some(TUTOR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["status"], "cancelled");

    let (_, listings) = send(&app, Method::GET, "/api/sessions", Some(BOB), None).await;
    assert!(listings.as_array().unwrap().is_empty());
}

// =============================================================================
// Registrations
// =============================================================================

#[tokio::test]
async fn register_twice_then_cancel_with_reason() {
    let app = app().await;
    let id = post_session(&app, "10:00:00", 60).await;
    let registrations = format!("/api/sessions/{id}/registrations");

    let (status, body) = send(&app, Method::POST, &registrations, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["registration"]["status"], "registered");

    let (status, body) = send(&app, Method::POST, &registrations, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_REGISTRATION");

    let (status, roster) = send(
        &app,
        Method::GET,
        &format!("/api/sessions/{id}/roster"),
        Some(TUTOR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roster[0]["name"], "Alice");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{registrations}/cancel"),
        Some(ALICE),
        Some(json!({ "reason": "schedule clash" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["registration"]["status"], "cancelled");
    assert_eq!(body["cancellation"]["reason"], "schedule clash");

    let (status, cancellations) = send(
        &app,
        Method::GET,
        &format!("/api/sessions/{id}/cancellations"),
        Some(TUTOR),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancellations.as_array().unwrap().len(), 1);

    let (_, schedule) = send(&app, Method::GET, "/api/schedule", Some(ALICE), None).await;
    assert!(schedule.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn blank_cancellation_reason_is_rejected() {
    let app = app().await;
    let id = post_session(&app, "10:00:00", 60).await;
    let registrations = format!("/api/sessions/{id}/registrations");
    send(&app, Method::POST, &registrations, Some(BOB), None).await;

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("{registrations}/cancel"),
        Some(BOB),
        Some(json!({ "reason": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "reason");
}

#[tokio::test]
async fn roster_is_tutor_only() {
    let app = app().await;
    let id = post_session(&app, "10:00:00", 60).await;
    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/sessions/{id}/roster"),
        Some(ALICE),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// =============================================================================
// Requests
// =============================================================================

#[tokio::test]
async fn request_lifecycle_over_http() {
    let app = app().await;
    let topic = json!({ "subject": "Physics", "topic": "Optics", "level": "Advanced" });

    let (status, created) =
        send(&app, Method::POST, "/api/requests", Some(ALICE), Some(topic.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["outcome"], "created");
    let request_id = created["request_id"].as_str().unwrap().to_string();

    let (status, joined) = send(&app, Method::POST, "/api/requests", Some(BOB), Some(topic)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["outcome"], "joined");
    assert_eq!(joined["participant_count"], 2);

    let (status, pending) = send(&app, Method::GET, "/api/requests", Some(BOB), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending[0]["participating"], true);

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/api/requests/{request_id}/fulfill"),
        Some(TUTOR),
        Some(session_body("15:00:00", 90)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["session"]["from_request"], true);
    // Topic fields in the body are ignored; the session keeps the requested topic.
    assert_eq!(body["session"]["subject"], "Physics");
    assert_eq!(body["session"]["topic"], "Optics");
    assert_eq!(body["session"]["level"], "Advanced");
    assert_eq!(body["registered_students"].as_array().unwrap().len(), 2);

    let (_, pending) = send(&app, Method::GET, "/api/requests", Some(BOB), None).await;
    assert!(pending.as_array().unwrap().is_empty());

    let (_, schedule) = send(&app, Method::GET, "/api/schedule", Some(ALICE), None).await;
    assert_eq!(schedule[0]["session"]["start_time"], "15:00:00");
}

#[tokio::test]
async fn joining_by_id_is_idempotent() {
    let app = app().await;
    let topic = json!({ "subject": "History", "topic": "Rome", "level": "Advanced" });
    let (_, created) = send(&app, Method::POST, "/api/requests", Some(ALICE), Some(topic)).await;
    let join = format!("/api/requests/{}/join", created["request_id"].as_str().unwrap());

    let (status, again) = send(&app, Method::POST, &join, Some(ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["outcome"], "already_participating");
    assert_eq!(again["participant_count"], 1);
}

#[tokio::test]
async fn tutors_cannot_submit_requests() {
    let app = app().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/requests",
        Some(TUTOR),
        Some(json!({ "subject": "Math", "topic": "Algebra", "level": "Beginner" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
