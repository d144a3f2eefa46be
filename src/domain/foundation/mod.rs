//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, enums, and error types
//! that form the vocabulary of the scheduling domain.

mod errors;
mod identifier;
mod ids;
mod level;
mod state_machine;
mod status;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use identifier::{IdentifierGenerator, DEFAULT_IDENTIFIER_WIDTH};
pub use ids::{EntityKind, RegistrationId, RequestId, SessionId, StudentId, TutorId};
pub use level::Level;
pub use state_machine::StateMachine;
pub use status::{RegistrationStatus, RequestStatus, SessionStatus};
pub use timestamp::Timestamp;
