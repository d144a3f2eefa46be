//! Errors surfaced by the scheduling engine.

use thiserror::Error;

use super::ConflictingSession;
use crate::domain::foundation::{
    DomainError, EntityKind, ErrorCode, SessionId, StudentId, ValidationError,
};

/// Outcome taxonomy of every engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulingError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Time slot conflicts with {} existing session(s)", .conflicts.len())]
    Conflict { conflicts: Vec<ConflictingSession> },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: String },

    #[error("Student {student_id} is already registered for session {session_id}")]
    AlreadyRegistered {
        student_id: StudentId,
        session_id: SessionId,
    },

    #[error("No {0} identifiers left")]
    IdentifierExhausted(EntityKind),

    #[error("Store failure: {0}")]
    Store(String),
}

impl SchedulingError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SchedulingError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(entity: EntityKind, id: impl ToString) -> Self {
        SchedulingError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SchedulingError::Validation { .. } => ErrorCode::ValidationFailed,
            SchedulingError::Conflict { .. } => ErrorCode::SlotTaken,
            SchedulingError::Forbidden(_) => ErrorCode::Forbidden,
            SchedulingError::NotFound { entity, .. } => match entity {
                EntityKind::Student => ErrorCode::StudentNotFound,
                EntityKind::Tutor => ErrorCode::TutorNotFound,
                EntityKind::Request => ErrorCode::RequestNotFound,
                EntityKind::Session => ErrorCode::SessionNotFound,
                EntityKind::Registration => ErrorCode::RegistrationNotFound,
            },
            SchedulingError::AlreadyRegistered { .. } => ErrorCode::DuplicateRegistration,
            SchedulingError::IdentifierExhausted(_) => ErrorCode::IdentifierExhausted,
            SchedulingError::Store(_) => ErrorCode::DatabaseError,
        }
    }
}

impl From<ValidationError> for SchedulingError {
    fn from(err: ValidationError) -> Self {
        SchedulingError::Validation {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

fn kind_detail(err: &DomainError) -> Option<EntityKind> {
    let name = err.detail("kind")?;
    EntityKind::all().iter().copied().find(|k| k.to_string() == name)
}

impl From<DomainError> for SchedulingError {
    fn from(err: DomainError) -> Self {
        let id = || err.detail("id").unwrap_or_default().to_string();
        match err.code {
            ErrorCode::ValidationFailed => SchedulingError::Validation {
                field: err.detail("field").unwrap_or("input").to_string(),
                message: err.message.clone(),
            },
            ErrorCode::StudentNotFound => SchedulingError::not_found(EntityKind::Student, id()),
            ErrorCode::TutorNotFound => SchedulingError::not_found(EntityKind::Tutor, id()),
            ErrorCode::SessionNotFound => SchedulingError::not_found(EntityKind::Session, id()),
            ErrorCode::RequestNotFound => SchedulingError::not_found(EntityKind::Request, id()),
            ErrorCode::RegistrationNotFound => {
                SchedulingError::not_found(EntityKind::Registration, id())
            }
            ErrorCode::Forbidden => SchedulingError::Forbidden(err.message.clone()),
            ErrorCode::SlotTaken => SchedulingError::Conflict { conflicts: vec![] },
            ErrorCode::DuplicateRegistration => {
                let student = err.detail("student_id").and_then(|s| StudentId::new(s).ok());
                let session = err.detail("session_id").and_then(|s| SessionId::new(s).ok());
                match (student, session) {
                    (Some(student_id), Some(session_id)) => SchedulingError::AlreadyRegistered {
                        student_id,
                        session_id,
                    },
                    _ => SchedulingError::Store(err.message.clone()),
                }
            }
            ErrorCode::IdentifierExhausted => match kind_detail(&err) {
                Some(kind) => SchedulingError::IdentifierExhausted(kind),
                None => SchedulingError::Store(err.message.clone()),
            },
            ErrorCode::InvalidStateTransition
            | ErrorCode::DuplicateRequest
            | ErrorCode::DuplicateEmail
            | ErrorCode::DatabaseError
            | ErrorCode::InternalError => SchedulingError::Store(err.to_string()),
        }
    }
}
