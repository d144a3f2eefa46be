//! HTTP routes for session endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    cancel_session, create_session, get_session, list_available, list_mine, session_cancellations,
    session_history, session_roster, update_session,
};
use crate::adapters::http::EngineState;

/// Creates the session router with all endpoints.
pub fn session_routes(engine: EngineState) -> Router {
    Router::new()
        .route("/", post(create_session).get(list_available))
        .route("/mine", get(list_mine))
        .route("/:id", get(get_session).patch(update_session))
        .route("/:id/cancel", post(cancel_session))
        .route("/:id/history", get(session_history))
        .route("/:id/cancellations", get(session_cancellations))
        .route("/:id/roster", get(session_roster))
        .with_state(engine)
}
