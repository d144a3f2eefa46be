//! Lifecycle status enums for sessions, requests and registrations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{StateMachine, ValidationError};

/// Lifecycle status of a scheduled session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    #[default]
    Active,
    Cancelled,
}

impl SessionStatus {
    /// Returns true if the session can be modified or booked.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionStatus::Active)
    }

    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Cancelled => "cancelled",
        }
    }
}

impl StateMachine for SessionStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionStatus::*;
        matches!((self, target), (Active, Cancelled))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            SessionStatus::Active => vec![SessionStatus::Cancelled],
            SessionStatus::Cancelled => vec![],
        }
    }
}

/// Lifecycle status of a topic request.
///
/// A request is fulfilled exactly once; there is no way back to pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Fulfilled,
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Fulfilled => "fulfilled",
        }
    }
}

impl StateMachine for RequestStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RequestStatus::*;
        matches!((self, target), (Pending, Fulfilled))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            RequestStatus::Pending => vec![RequestStatus::Fulfilled],
            RequestStatus::Fulfilled => vec![],
        }
    }
}

/// Status of a student's registration for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    #[default]
    Registered,
    Cancelled,
}

impl RegistrationStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, RegistrationStatus::Registered)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationStatus::Registered => "registered",
            RegistrationStatus::Cancelled => "cancelled",
        }
    }
}

impl StateMachine for RegistrationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use RegistrationStatus::*;
        matches!((self, target), (Registered, Cancelled))
    }

    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            RegistrationStatus::Registered => vec![RegistrationStatus::Cancelled],
            RegistrationStatus::Cancelled => vec![],
        }
    }
}

macro_rules! status_from_str {
    ($name:ident, $field:literal, [$($text:literal => $variant:ident),+]) => {
        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ValidationError::invalid_format(
                        $field,
                        format!("unknown status '{}'", other),
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

status_from_str!(SessionStatus, "session_status", ["active" => Active, "cancelled" => Cancelled]);
status_from_str!(RequestStatus, "request_status", ["pending" => Pending, "fulfilled" => Fulfilled]);
status_from_str!(
    RegistrationStatus,
    "registration_status",
    ["registered" => Registered, "cancelled" => Cancelled]
);
