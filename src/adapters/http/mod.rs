//! HTTP adapters - REST API implementations.
//!
//! Each area (sessions, requests, registrations) has its own DTOs, handlers
//! and routes. `api_router` assembles them over a shared engine.

pub mod error;
pub mod middleware;
pub mod registration;
pub mod request;
pub mod session;

use std::sync::Arc;

use axum::{routing::get, Json, Router};

use crate::application::SchedulingEngine;

pub use error::{ApiError, ErrorResponse};
pub use registration::registration_routes;
pub use request::request_routes;
pub use session::session_routes;

/// Router state shared by every handler.
pub type EngineState = Arc<SchedulingEngine>;

/// Builds the full API router.
///
/// ```ignore
/// let app = api_router(Arc::new(engine));
/// axum::serve(listener, app).await?;
/// ```
pub fn api_router(engine: EngineState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/sessions", session_routes(engine.clone()))
        .nest("/api/requests", request_routes(engine.clone()))
        .merge(registration_routes(engine))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
