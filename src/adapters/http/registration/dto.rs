//! HTTP DTOs for registration endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::RegistrationStatus;
use crate::domain::registration::{Cancellation, Registration};
use crate::domain::scheduling::{ConflictOverride, ConflictingSession};
use crate::domain::session::SessionUpdate;
use crate::ports::ScheduledSessionView;

use crate::adapters::http::session::SessionResponse;

/// Request to register for a session.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default, rename = "override")]
    pub override_conflicts: bool,
}

impl RegisterRequest {
    pub fn conflict_override(&self) -> ConflictOverride {
        ConflictOverride::from_flag(self.override_conflicts)
    }
}

/// Request to cancel a registration.
#[derive(Debug, Clone, Deserialize)]
pub struct CancelRegistrationRequest {
    pub reason: String,
}

/// Registration view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationResponse {
    pub id: String,
    pub student_id: String,
    pub session_id: String,
    pub registered_on: NaiveDate,
    pub status: RegistrationStatus,
}

impl From<&Registration> for RegistrationResponse {
    fn from(registration: &Registration) -> Self {
        Self {
            id: registration.id().to_string(),
            student_id: registration.student_id().to_string(),
            session_id: registration.session_id().to_string(),
            registered_on: registration.registered_on(),
            status: registration.status(),
        }
    }
}

/// Response for a successful registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub registration: RegistrationResponse,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overridden: Vec<ConflictingSession>,
}

/// Response for a cancelled registration.
#[derive(Debug, Clone, Serialize)]
pub struct CancelRegistrationResponse {
    pub registration: RegistrationResponse,
    pub cancellation: Cancellation,
}

/// One entry of a student's schedule.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleEntryResponse {
    pub session: SessionResponse,
    pub tutor_name: String,
    pub registered_on: NaiveDate,
    pub updates: Vec<SessionUpdate>,
}

impl From<ScheduledSessionView> for ScheduleEntryResponse {
    fn from(view: ScheduledSessionView) -> Self {
        Self {
            session: SessionResponse::from(&view.session),
            tutor_name: view.tutor_name,
            registered_on: view.registered_on,
            updates: view.updates,
        }
    }
}
