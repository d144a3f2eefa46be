//! HTTP DTOs for session endpoints.
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Level, SessionStatus};
use crate::domain::scheduling::{ConflictOverride, ConflictingSession};
use crate::domain::session::{DeliveryMode, Session, SessionChange, SessionDetails, SessionUpdate};
use crate::ports::{RosterEntry, SessionListing};

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Request to post a new session.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(flatten)]
    pub details: SessionDetails,
    /// Proceed despite detected conflicts.
    #[serde(default, rename = "override")]
    pub override_conflicts: bool,
}

impl CreateSessionRequest {
    pub fn conflict_override(&self) -> ConflictOverride {
        ConflictOverride::from_flag(self.override_conflicts)
    }
}

/// Partial edit of a session. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSessionRequest {
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub level: Option<Level>,
    pub details: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub duration_minutes: Option<u32>,
    pub mode: Option<DeliveryMode>,
    #[serde(default, rename = "override")]
    pub override_conflicts: bool,
}

impl UpdateSessionRequest {
    /// The typed diffs this request asks for, in a fixed field order.
    pub fn changes(&self) -> Vec<SessionChange> {
        let mut changes = Vec::new();
        if let Some(subject) = &self.subject {
            changes.push(SessionChange::Subject(subject.clone()));
        }
        if let Some(topic) = &self.topic {
            changes.push(SessionChange::Topic(topic.clone()));
        }
        if let Some(level) = self.level {
            changes.push(SessionChange::Level(level));
        }
        if let Some(details) = &self.details {
            changes.push(SessionChange::Details(details.clone()));
        }
        if let Some(date) = self.date {
            changes.push(SessionChange::Date(date));
        }
        if let Some(start) = self.start_time {
            changes.push(SessionChange::StartTime(start));
        }
        if let Some(minutes) = self.duration_minutes {
            changes.push(SessionChange::Duration(minutes));
        }
        if let Some(mode) = &self.mode {
            changes.push(SessionChange::Mode(mode.clone()));
        }
        changes
    }

    pub fn conflict_override(&self) -> ConflictOverride {
        ConflictOverride::from_flag(self.override_conflicts)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Session view for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub tutor_id: String,
    pub subject: String,
    pub topic: String,
    pub level: Level,
    pub details: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_minutes: u32,
    #[serde(flatten)]
    pub mode: DeliveryMode,
    pub status: SessionStatus,
    pub from_request: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id().to_string(),
            tutor_id: session.tutor_id().to_string(),
            subject: session.subject().to_string(),
            topic: session.topic().to_string(),
            level: session.level(),
            details: session.details().to_string(),
            date: session.date(),
            start_time: session.start_time(),
            end_time: session.end_time(),
            duration_minutes: session.duration_minutes(),
            mode: session.mode().clone(),
            status: session.status(),
            from_request: session.from_request_flag(),
            request_id: session.request_id().map(|id| id.to_string()),
        }
    }
}

/// Session with its tutor's name and seat count.
#[derive(Debug, Clone, Serialize)]
pub struct SessionListingResponse {
    #[serde(flatten)]
    pub session: SessionResponse,
    pub tutor_name: String,
    pub active_registrations: u32,
}

impl From<SessionListing> for SessionListingResponse {
    fn from(listing: SessionListing) -> Self {
        Self {
            session: SessionResponse::from(&listing.session),
            tutor_name: listing.tutor_name,
            active_registrations: listing.active_registrations,
        }
    }
}

/// Response for session writes.
#[derive(Debug, Clone, Serialize)]
pub struct SessionCommandResponse {
    pub session: SessionResponse,
    /// Audit rows written by this command.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub updates: Vec<SessionUpdate>,
    /// Conflicts the caller chose to override.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub overridden: Vec<ConflictingSession>,
}

/// One registered student of a session.
#[derive(Debug, Clone, Serialize)]
pub struct RosterEntryResponse {
    pub registration_id: String,
    pub student_id: String,
    pub name: String,
    pub email: String,
    pub registered_on: NaiveDate,
}

impl From<RosterEntry> for RosterEntryResponse {
    fn from(entry: RosterEntry) -> Self {
        Self {
            registration_id: entry.registration.id().to_string(),
            student_id: entry.student.id.to_string(),
            name: entry.student.name,
            email: entry.student.email,
            registered_on: entry.registration.registered_on(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_reads_flattened_details_and_override() {
        let json = r#"{
            "subject": "Math",
            "topic": "Algebra",
            "level": "Beginner",
            "date": "2026-11-02",
            "start_time": "10:00:00",
            "duration_minutes": 60,
            "mode": "In-person",
            "location": "Room 4",
            "override": true
        }"#;
        let req: CreateSessionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.details.subject, "Math");
        assert_eq!(req.details.details, "");
        assert_eq!(req.details.mode.location(), Some("Room 4"));
        assert_eq!(req.conflict_override(), ConflictOverride::Proceed);
    }

    #[test]
    fn override_defaults_to_reject() {
        let json = r#"{
            "subject": "Math", "topic": "Algebra", "level": "Advanced",
            "date": "2026-11-02", "start_time": "10:00:00", "duration_minutes": 30,
            "mode": "Online", "online_link": "https://meet.example/x"
        }"#;
        let req: CreateSessionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.conflict_override(), ConflictOverride::Reject);
    }

    #[test]
    fn update_request_lists_only_present_fields() {
        let json = r#"{"start_time": "13:00:00", "duration_minutes": 90}"#;
        let req: UpdateSessionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(
            req.changes(),
            vec![
                SessionChange::StartTime(NaiveTime::from_hms_opt(13, 0, 0).unwrap()),
                SessionChange::Duration(90),
            ]
        );
    }

    #[test]
    fn empty_update_has_no_changes() {
        assert!(UpdateSessionRequest::default().changes().is_empty());
    }
}
