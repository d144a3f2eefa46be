//! HTTP handlers for session endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{AnyCaller, RequireTutor};
use crate::adapters::http::EngineState;
use crate::application::{CancelSessionCommand, CreateSessionCommand, UpdateSessionCommand};
use crate::domain::foundation::SessionId;

use super::dto::{
    CreateSessionRequest, RosterEntryResponse, SessionCommandResponse, SessionListingResponse,
    SessionResponse, UpdateSessionRequest,
};

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    Ok(SessionId::new(raw)?)
}

/// POST /api/sessions - Post a new session
pub async fn create_session(
    State(engine): State<EngineState>,
    RequireTutor(tutor_id): RequireTutor,
    Json(req): Json<CreateSessionRequest>,
) -> Result<Response, ApiError> {
    let conflict_override = req.conflict_override();
    let result = engine
        .create_session(CreateSessionCommand {
            tutor_id,
            details: req.details,
            conflict_override,
        })
        .await?;

    let response = SessionCommandResponse {
        session: SessionResponse::from(&result.session),
        updates: Vec::new(),
        overridden: result.overridden,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// GET /api/sessions - Bookable sessions
pub async fn list_available(
    State(engine): State<EngineState>,
    AnyCaller(_caller): AnyCaller,
) -> Result<Json<Vec<SessionListingResponse>>, ApiError> {
    let listings = engine.available_sessions().await?;
    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

/// GET /api/sessions/mine - The calling tutor's upcoming sessions
pub async fn list_mine(
    State(engine): State<EngineState>,
    RequireTutor(tutor_id): RequireTutor,
) -> Result<Json<Vec<SessionListingResponse>>, ApiError> {
    let listings = engine.tutor_sessions(&tutor_id).await?;
    Ok(Json(listings.into_iter().map(Into::into).collect()))
}

/// GET /api/sessions/:id - Session details
pub async fn get_session(
    State(engine): State<EngineState>,
    AnyCaller(_caller): AnyCaller,
    Path(session_id): Path<String>,
) -> Result<Json<SessionListingResponse>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    Ok(Json(engine.get_session(&session_id).await?.into()))
}

/// PATCH /api/sessions/:id - Edit a session
pub async fn update_session(
    State(engine): State<EngineState>,
    RequireTutor(tutor_id): RequireTutor,
    Path(session_id): Path<String>,
    Json(req): Json<UpdateSessionRequest>,
) -> Result<Json<SessionCommandResponse>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let result = engine
        .update_session(UpdateSessionCommand {
            session_id,
            tutor_id,
            changes: req.changes(),
            conflict_override: req.conflict_override(),
        })
        .await?;

    Ok(Json(SessionCommandResponse {
        session: SessionResponse::from(&result.session),
        updates: result.updates,
        overridden: result.overridden,
    }))
}

/// POST /api/sessions/:id/cancel - Withdraw a session
pub async fn cancel_session(
    State(engine): State<EngineState>,
    RequireTutor(tutor_id): RequireTutor,
    Path(session_id): Path<String>,
) -> Result<Json<SessionCommandResponse>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let result = engine
        .cancel_session(CancelSessionCommand {
            session_id,
            tutor_id,
        })
        .await?;

    Ok(Json(SessionCommandResponse {
        session: SessionResponse::from(&result.session),
        updates: vec![result.update],
        overridden: Vec::new(),
    }))
}

/// GET /api/sessions/:id/history - Field-level update history
pub async fn session_history(
    State(engine): State<EngineState>,
    AnyCaller(_caller): AnyCaller,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let history = engine.session_history(&session_id).await?;
    Ok(Json(history).into_response())
}

/// GET /api/sessions/:id/cancellations - Registration cancellations (tutor only)
pub async fn session_cancellations(
    State(engine): State<EngineState>,
    RequireTutor(tutor_id): RequireTutor,
    Path(session_id): Path<String>,
) -> Result<Response, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let cancellations = engine.session_cancellations(&session_id, &tutor_id).await?;
    Ok(Json(cancellations).into_response())
}

/// GET /api/sessions/:id/roster - Registered students (tutor only)
pub async fn session_roster(
    State(engine): State<EngineState>,
    RequireTutor(tutor_id): RequireTutor,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<RosterEntryResponse>>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    let roster = engine.session_roster(&session_id, &tutor_id).await?;
    Ok(Json(roster.into_iter().map(Into::into).collect()))
}
