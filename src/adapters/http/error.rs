//! Error responses shared by every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::domain::foundation::ValidationError;
use crate::domain::scheduling::SchedulingError;

/// Standard error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn from_error(err: &SchedulingError) -> Self {
        let details = match err {
            SchedulingError::Conflict { conflicts } => {
                Some(serde_json::json!({ "conflicts": conflicts }))
            }
            SchedulingError::Validation { field, .. } => Some(serde_json::json!({ "field": field })),
            _ => None,
        };
        let message = match err {
            // Store failures are logged in full; clients get a generic message.
            SchedulingError::Store(_) => "Internal storage error".to_string(),
            other => other.to_string(),
        };
        Self {
            code: err.code().to_string(),
            message,
            details,
        }
    }
}

/// Engine errors as HTTP responses.
#[derive(Debug)]
pub struct ApiError(pub SchedulingError);

impl From<SchedulingError> for ApiError {
    fn from(err: SchedulingError) -> Self {
        ApiError(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError(err.into())
    }
}

/// HTTP status for an engine error.
pub fn status_of(err: &SchedulingError) -> StatusCode {
    match err {
        SchedulingError::Validation { .. } => StatusCode::BAD_REQUEST,
        SchedulingError::Forbidden(_) => StatusCode::FORBIDDEN,
        SchedulingError::NotFound { .. } => StatusCode::NOT_FOUND,
        SchedulingError::Conflict { .. } | SchedulingError::AlreadyRegistered { .. } => {
            StatusCode::CONFLICT
        }
        SchedulingError::IdentifierExhausted(_) | SchedulingError::Store(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_of(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        }
        (status, Json(ErrorResponse::from_error(&self.0))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::EntityKind;

    #[test]
    fn not_found_maps_to_404() {
        let err = SchedulingError::not_found(EntityKind::Session, "sess_001");
        assert_eq!(ApiError(err).into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn forbidden_maps_to_403() {
        let err = SchedulingError::Forbidden("not yours".into());
        assert_eq!(ApiError(err).into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn validation_maps_to_400_with_field() {
        let err = SchedulingError::validation("topic", "Field 'topic' cannot be empty");
        let body = ErrorResponse::from_error(&err);
        assert_eq!(body.code, "VALIDATION_FAILED");
        assert_eq!(body.details, Some(serde_json::json!({ "field": "topic" })));
        assert_eq!(status_of(&err), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_and_already_registered_map_to_409() {
        let conflict = SchedulingError::Conflict { conflicts: vec![] };
        assert_eq!(status_of(&conflict), StatusCode::CONFLICT);
        let body = ErrorResponse::from_error(&conflict);
        assert_eq!(body.code, "SLOT_TAKEN");
        assert!(body.details.is_some());
    }

    #[test]
    fn store_failures_hide_internal_message() {
        let err = SchedulingError::Store("connection reset by peer".into());
        let body = ErrorResponse::from_error(&err);
        assert_eq!(status_of(&err), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.message.contains("connection"));
    }
}
