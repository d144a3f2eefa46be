//! Caller identity for every engine operation.
//!
//! Identity is supplied explicitly by the surrounding auth component; the
//! engine never keeps an ambient "current user". The identifier prefix
//! tells a student caller (`st_`) from a tutor caller (`ttr_`).
//!
//! # Example
//!
//! ```ignore
//! let caller: Caller = "ttr_004".parse()?;
//! let tutor_id = caller.require_tutor()?;
//! ```

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::domain::foundation::{EntityKind, StudentId, TutorId};

/// Who is performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Caller {
    Student(StudentId),
    Tutor(TutorId),
}

/// Why a caller could not be accepted for an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallerError {
    /// No identity was supplied.
    #[error("Caller identity missing")]
    Missing,

    /// The identity is neither a student nor a tutor identifier.
    #[error("Unrecognized caller identity '{0}'")]
    Unrecognized(String),

    /// The caller is valid but has the wrong role for this operation.
    #[error("Operation requires a {required} caller")]
    WrongRole { required: EntityKind },
}

impl CallerError {
    /// Returns true if the caller should re-authenticate rather than
    /// retry with the same identity in a different role.
    pub fn requires_authentication(&self) -> bool {
        matches!(self, CallerError::Missing | CallerError::Unrecognized(_))
    }
}

impl Caller {
    pub fn require_student(&self) -> Result<&StudentId, CallerError> {
        match self {
            Caller::Student(id) => Ok(id),
            Caller::Tutor(_) => Err(CallerError::WrongRole {
                required: EntityKind::Student,
            }),
        }
    }

    pub fn require_tutor(&self) -> Result<&TutorId, CallerError> {
        match self {
            Caller::Tutor(id) => Ok(id),
            Caller::Student(_) => Err(CallerError::WrongRole {
                required: EntityKind::Tutor,
            }),
        }
    }
}

impl FromStr for Caller {
    type Err = CallerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CallerError::Missing);
        }
        if let Ok(id) = StudentId::new(s) {
            return Ok(Caller::Student(id));
        }
        if let Ok(id) = TutorId::new(s) {
            return Ok(Caller::Tutor(id));
        }
        Err(CallerError::Unrecognized(s.to_string()))
    }
}

impl fmt::Display for Caller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Caller::Student(id) => write!(f, "{}", id),
            Caller::Tutor(id) => write!(f, "{}", id),
        }
    }
}
