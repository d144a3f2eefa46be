//! Append-only record of registration cancellations.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, StudentId, Timestamp, ValidationError};

/// Maximum length of a cancellation reason.
pub const MAX_REASON_LENGTH: usize = 500;

/// Why a student cancelled. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CancellationReason(String);

impl CancellationReason {
    pub fn new(reason: impl Into<String>) -> Result<Self, ValidationError> {
        let reason = reason.into().trim().to_string();
        if reason.is_empty() {
            return Err(ValidationError::empty_field("reason"));
        }
        let len = reason.chars().count();
        if len > MAX_REASON_LENGTH {
            return Err(ValidationError::out_of_range(
                "reason",
                1,
                MAX_REASON_LENGTH as i64,
                len as i64,
            ));
        }
        Ok(Self(reason))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CancellationReason {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CancellationReason> for String {
    fn from(reason: CancellationReason) -> Self {
        reason.0
    }
}

/// One cancelled registration. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub session_id: SessionId,
    pub student_id: StudentId,
    pub reason: CancellationReason,
    pub cancelled_at: Timestamp,
}
