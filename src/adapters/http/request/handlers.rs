//! HTTP handlers for topic request endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::adapters::http::error::ApiError;
use crate::adapters::http::middleware::{RequireStudent, RequireTutor};
use crate::adapters::http::EngineState;
use crate::application::{FulfillRequestCommand, JoinRequestCommand, SubmitRequestCommand};
use crate::domain::foundation::RequestId;
use crate::domain::request::{JoinOutcome, RequestTopic};

use super::dto::{
    FulfillTopicRequest, FulfillmentResponse, ParticipationResponse, PendingRequestResponse,
    SubmitTopicRequest,
};

/// POST /api/requests - Open a request, or join the matching pending one
pub async fn submit_request(
    State(engine): State<EngineState>,
    RequireStudent(student_id): RequireStudent,
    Json(req): Json<SubmitTopicRequest>,
) -> Result<Response, ApiError> {
    let result = engine
        .submit_request(SubmitRequestCommand {
            student_id,
            topic: RequestTopic {
                subject: req.subject,
                topic: req.topic,
                level: req.level,
                details: req.details,
            },
        })
        .await?;

    let status = match result.outcome {
        JoinOutcome::Created => StatusCode::CREATED,
        JoinOutcome::Joined | JoinOutcome::AlreadyParticipating => StatusCode::OK,
    };
    Ok((status, Json(ParticipationResponse::from(result))).into_response())
}

/// GET /api/requests - Pending requests, newest first
pub async fn list_pending(
    State(engine): State<EngineState>,
    RequireStudent(student_id): RequireStudent,
) -> Result<Json<Vec<PendingRequestResponse>>, ApiError> {
    let views = engine.pending_requests(&student_id).await?;
    Ok(Json(views.into_iter().map(Into::into).collect()))
}

/// POST /api/requests/:id/join - Add the caller to a pending request
pub async fn join_request(
    State(engine): State<EngineState>,
    RequireStudent(student_id): RequireStudent,
    Path(request_id): Path<String>,
) -> Result<Json<ParticipationResponse>, ApiError> {
    let request_id = RequestId::new(request_id)?;
    let result = engine
        .join_request(JoinRequestCommand {
            student_id,
            request_id,
        })
        .await?;
    Ok(Json(result.into()))
}

/// POST /api/requests/:id/fulfill - Turn a pending request into a session
pub async fn fulfill_request(
    State(engine): State<EngineState>,
    RequireTutor(tutor_id): RequireTutor,
    Path(request_id): Path<String>,
    Json(req): Json<FulfillTopicRequest>,
) -> Result<Response, ApiError> {
    let request_id = RequestId::new(request_id)?;
    let conflict_override = req.conflict_override();
    let result = engine
        .fulfill_request(FulfillRequestCommand {
            request_id,
            tutor_id,
            schedule: req.schedule,
            conflict_override,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(FulfillmentResponse::from(result))).into_response())
}
