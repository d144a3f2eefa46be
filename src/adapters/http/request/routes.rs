//! HTTP routes for topic request endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{fulfill_request, join_request, list_pending, submit_request};
use crate::adapters::http::EngineState;

/// Creates the request router with all endpoints.
pub fn request_routes(engine: EngineState) -> Router {
    Router::new()
        .route("/", get(list_pending).post(submit_request))
        .route("/:id/join", post(join_request))
        .route("/:id/fulfill", post(fulfill_request))
        .with_state(engine)
}
