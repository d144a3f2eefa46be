//! HTTP handlers for registration endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::{ApiError, ErrorResponse};
use crate::adapters::http::middleware::RequireStudent;
use crate::adapters::http::EngineState;
use crate::application::{CancelRegistrationCommand, RegisterCommand};
use crate::domain::foundation::SessionId;

use super::dto::{
    CancelRegistrationRequest, CancelRegistrationResponse, RegisterRequest, RegisterResponse,
    RegistrationResponse, ScheduleEntryResponse,
};

/// POST /api/sessions/:id/registrations - Register the caller
///
/// The body is optional; an empty body registers without overriding conflicts.
pub async fn register(
    State(engine): State<EngineState>,
    RequireStudent(student_id): RequireStudent,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let req = if body.is_empty() {
        RegisterRequest::default()
    } else {
        match serde_json::from_slice::<RegisterRequest>(&body) {
            Ok(req) => req,
            Err(err) => {
                return Ok((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse::bad_request(err.to_string())),
                )
                    .into_response())
            }
        }
    };

    let session_id = SessionId::new(session_id)?;
    let result = engine
        .register(RegisterCommand {
            student_id,
            session_id,
            conflict_override: req.conflict_override(),
        })
        .await?;

    let response = RegisterResponse {
        registration: RegistrationResponse::from(&result.registration),
        overridden: result.overridden,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// POST /api/sessions/:id/registrations/cancel - Cancel the caller's registration
pub async fn cancel_registration(
    State(engine): State<EngineState>,
    RequireStudent(student_id): RequireStudent,
    Path(session_id): Path<String>,
    Json(req): Json<CancelRegistrationRequest>,
) -> Result<Json<CancelRegistrationResponse>, ApiError> {
    let session_id = SessionId::new(session_id)?;
    let result = engine
        .cancel_registration(CancelRegistrationCommand {
            student_id,
            session_id,
            reason: req.reason,
        })
        .await?;

    Ok(Json(CancelRegistrationResponse {
        registration: RegistrationResponse::from(&result.registration),
        cancellation: result.cancellation,
    }))
}

/// GET /api/schedule - The caller's upcoming sessions
pub async fn my_schedule(
    State(engine): State<EngineState>,
    RequireStudent(student_id): RequireStudent,
) -> Result<Json<Vec<ScheduleEntryResponse>>, ApiError> {
    let schedule = engine.student_schedule(&student_id).await?;
    Ok(Json(schedule.into_iter().map(Into::into).collect()))
}
