//! HTTP DTOs for topic request endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::{FulfillRequestResult, RequestParticipationResult};
use crate::domain::foundation::{Level, RequestStatus};
use crate::domain::request::JoinOutcome;
use crate::domain::scheduling::{ConflictOverride, ConflictingSession};
use crate::domain::session::SessionSchedule;
use crate::ports::PendingRequestView;

use crate::adapters::http::session::SessionResponse;

/// Request to post a new topic request.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitTopicRequest {
    pub subject: String,
    pub topic: String,
    pub level: Level,
    #[serde(default)]
    pub details: String,
}

/// A tutor's answer to a pending request: when and where it happens.
#[derive(Debug, Clone, Deserialize)]
pub struct FulfillTopicRequest {
    #[serde(flatten)]
    pub schedule: SessionSchedule,
    #[serde(default, rename = "override")]
    pub override_conflicts: bool,
}

impl FulfillTopicRequest {
    pub fn conflict_override(&self) -> ConflictOverride {
        ConflictOverride::from_flag(self.override_conflicts)
    }
}

/// Result of submitting or joining a request.
#[derive(Debug, Clone, Serialize)]
pub struct ParticipationResponse {
    pub request_id: String,
    pub outcome: JoinOutcome,
    pub participant_count: u32,
}

impl From<RequestParticipationResult> for ParticipationResponse {
    fn from(result: RequestParticipationResult) -> Self {
        Self {
            request_id: result.request_id.to_string(),
            outcome: result.outcome,
            participant_count: result.participant_count,
        }
    }
}

/// A pending request in the list view.
#[derive(Debug, Clone, Serialize)]
pub struct PendingRequestResponse {
    pub id: String,
    pub subject: String,
    pub topic: String,
    pub level: Level,
    pub details: String,
    pub created_on: NaiveDate,
    pub status: RequestStatus,
    pub participant_count: u32,
    pub participating: bool,
}

impl From<PendingRequestView> for PendingRequestResponse {
    fn from(view: PendingRequestView) -> Self {
        let request = view.request;
        Self {
            id: request.id().to_string(),
            subject: request.subject().to_string(),
            topic: request.topic().to_string(),
            level: request.level(),
            details: request.details().to_string(),
            created_on: request.created_on(),
            status: request.status(),
            participant_count: view.participant_count,
            participating: view.viewer_participates,
        }
    }
}

/// Outcome of a fulfillment.
#[derive(Debug, Clone, Serialize)]
pub struct FulfillmentResponse {
    pub session: SessionResponse,
    pub registered_students: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overridden: Vec<ConflictingSession>,
}

impl From<FulfillRequestResult> for FulfillmentResponse {
    fn from(result: FulfillRequestResult) -> Self {
        Self {
            session: SessionResponse::from(&result.session),
            registered_students: result
                .registrations
                .iter()
                .map(|r| r.student_id().to_string())
                .collect(),
            overridden: result.overridden,
        }
    }
}
