//! Strongly-typed, prefixed identifier value objects.
//!
//! Every persisted entity carries an identifier of the form
//! `<prefix><zero-padded sequence>`, e.g. `sess_007` or `st_042`. The prefix
//! identifies the entity kind, which also lets the edge tell a student
//! caller from a tutor caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// The kinds of entity that receive generated identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Student,
    Tutor,
    Request,
    Session,
    Registration,
}

impl EntityKind {
    /// Returns every kind, in allocation-lock order.
    pub fn all() -> &'static [EntityKind] {
        &[
            EntityKind::Student,
            EntityKind::Tutor,
            EntityKind::Request,
            EntityKind::Session,
            EntityKind::Registration,
        ]
    }

    /// Identifier prefix for this kind.
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::Student => "st_",
            EntityKind::Tutor => "ttr_",
            EntityKind::Request => "req_",
            EntityKind::Session => "sess_",
            EntityKind::Registration => "reg_",
        }
    }

    /// Parses the numeric sequence out of an identifier of this kind.
    ///
    /// Returns `None` when the prefix does not match or the remainder is
    /// not a plain decimal number.
    pub fn sequence_of(&self, id: &str) -> Option<u64> {
        let digits = id.strip_prefix(self.prefix())?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        digits.parse().ok()
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EntityKind::Student => "student",
            EntityKind::Tutor => "tutor",
            EntityKind::Request => "request",
            EntityKind::Session => "session",
            EntityKind::Registration => "registration",
        };
        write!(f, "{}", s)
    }
}

macro_rules! prefixed_id {
    ($(#[$meta:meta])* $name:ident, $kind:expr, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// The entity kind this identifier belongs to.
            pub const KIND: EntityKind = $kind;

            /// Creates an identifier, rejecting values with the wrong prefix.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                if Self::KIND.sequence_of(&id).is_none() {
                    return Err(ValidationError::invalid_format(
                        $field,
                        format!("expected '{}' followed by digits", Self::KIND.prefix()),
                    ));
                }
                Ok(Self(id))
            }

            /// Returns the inner string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the numeric sequence part of the identifier.
            pub fn sequence(&self) -> u64 {
                Self::KIND.sequence_of(&self.0).unwrap_or_default()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

prefixed_id!(
    /// Identifier of a registered student (`st_001`).
    StudentId,
    EntityKind::Student,
    "student_id"
);

prefixed_id!(
    /// Identifier of a registered tutor (`ttr_001`).
    TutorId,
    EntityKind::Tutor,
    "tutor_id"
);

prefixed_id!(
    /// Identifier of a topic request (`req_001`).
    RequestId,
    EntityKind::Request,
    "request_id"
);

prefixed_id!(
    /// Identifier of a scheduled tutoring session (`sess_001`).
    SessionId,
    EntityKind::Session,
    "session_id"
);

prefixed_id!(
    /// Identifier of a student's registration for a session (`reg_001`).
    RegistrationId,
    EntityKind::Registration,
    "registration_id"
);
