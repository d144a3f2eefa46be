//! HTTP routes for registration endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{cancel_registration, my_schedule, register};
use crate::adapters::http::EngineState;

/// Creates the registration router.
///
/// Paths are absolute because registrations hang off `/api/sessions/:id`;
/// merge this router rather than nesting it.
pub fn registration_routes(engine: EngineState) -> Router {
    Router::new()
        .route("/api/sessions/:id/registrations", post(register))
        .route(
            "/api/sessions/:id/registrations/cancel",
            post(cancel_registration),
        )
        .route("/api/schedule", get(my_schedule))
        .with_state(engine)
}
