//! Caller identity extractors for axum.
//!
//! The upstream auth component authenticates the user and forwards the
//! resulting identifier in the `X-Caller-Id` header. These extractors parse
//! it into a `Caller` and enforce the role an endpoint needs:
//!
//! - `AnyCaller` - any recognised student or tutor
//! - `RequireStudent` - a student identifier (`st_...`)
//! - `RequireTutor` - a tutor identifier (`ttr_...`)
//!
//! # Example
//!
//! ```ignore
//! async fn my_schedule(RequireStudent(student_id): RequireStudent) -> impl IntoResponse {
//!     format!("Schedule of {}", student_id)
//! }
//! ```

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::domain::account::{Caller, CallerError};
use crate::domain::foundation::{StudentId, TutorId};

/// Header carrying the authenticated caller's identifier.
pub const CALLER_HEADER: &str = "X-Caller-Id";

fn caller_from_parts(parts: &Parts) -> Result<Caller, CallerError> {
    let value = parts
        .headers
        .get(CALLER_HEADER)
        .ok_or(CallerError::Missing)?
        .to_str()
        .map_err(|_| CallerError::Unrecognized("<non-ascii>".to_string()))?;
    value.parse()
}

/// Extractor for any recognised caller.
#[derive(Debug, Clone)]
pub struct AnyCaller(pub Caller);

/// Extractor that requires a student caller.
#[derive(Debug, Clone)]
pub struct RequireStudent(pub StudentId);

/// Extractor that requires a tutor caller.
#[derive(Debug, Clone)]
pub struct RequireTutor(pub TutorId);

#[async_trait]
impl<S> FromRequestParts<S> for AnyCaller
where
    S: Send + Sync,
{
    type Rejection = CallerRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(AnyCaller(caller_from_parts(parts)?))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireStudent
where
    S: Send + Sync,
{
    type Rejection = CallerRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = caller_from_parts(parts)?;
        Ok(RequireStudent(caller.require_student()?.clone()))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireTutor
where
    S: Send + Sync,
{
    type Rejection = CallerRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let caller = caller_from_parts(parts)?;
        Ok(RequireTutor(caller.require_tutor()?.clone()))
    }
}

/// Rejection type for caller identity failures.
#[derive(Debug, Clone)]
pub struct CallerRejection(pub CallerError);

impl From<CallerError> for CallerRejection {
    fn from(err: CallerError) -> Self {
        CallerRejection(err)
    }
}

impl IntoResponse for CallerRejection {
    fn into_response(self) -> Response {
        let (status, code) = if self.0.requires_authentication() {
            (StatusCode::UNAUTHORIZED, "UNAUTHENTICATED")
        } else {
            (StatusCode::FORBIDDEN, "FORBIDDEN")
        };

        (
            status,
            Json(serde_json::json!({
                "code": code,
                "message": self.0.to_string(),
            })),
        )
            .into_response()
    }
}
