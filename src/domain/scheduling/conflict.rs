//! Tutor- and student-scoped conflict scans.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::TimeSlot;
use crate::domain::foundation::{SessionId, StudentId, TutorId};
use crate::domain::session::Session;

/// An existing session that overlaps a candidate slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictingSession {
    pub session_id: SessionId,
    pub tutor_id: TutorId,
    pub subject: String,
    pub topic: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl From<&Session> for ConflictingSession {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id().clone(),
            tutor_id: session.tutor_id().clone(),
            subject: session.subject().to_string(),
            topic: session.topic().to_string(),
            date: session.date(),
            start_time: session.start_time(),
            end_time: session.end_time(),
        }
    }
}

/// Whose schedule a candidate slot is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictScope {
    /// The tutor's own active sessions.
    Tutor(TutorId),
    /// Active sessions the student is registered for.
    Student(StudentId),
}

/// The caller's explicit, one-shot decision about detected conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictOverride {
    #[default]
    Reject,
    Proceed,
}

impl ConflictOverride {
    pub fn from_flag(proceed: bool) -> Self {
        if proceed {
            ConflictOverride::Proceed
        } else {
            ConflictOverride::Reject
        }
    }

    pub fn is_proceed(&self) -> bool {
        matches!(self, ConflictOverride::Proceed)
    }
}

/// Reports every active session in `existing` that overlaps `candidate`.
///
/// `exclude` skips the session being edited so it never conflicts with itself.
/// Results are ordered by start time.
pub fn find_conflicts<'a, I>(
    candidate: &TimeSlot,
    existing: I,
    exclude: Option<&SessionId>,
) -> Vec<ConflictingSession>
where
    I: IntoIterator<Item = &'a Session>,
{
    let mut conflicts: Vec<ConflictingSession> = existing
        .into_iter()
        .filter(|s| s.status().is_active())
        .filter(|s| exclude != Some(s.id()))
        .filter(|s| candidate.overlaps(&s.slot()))
        .map(ConflictingSession::from)
        .collect();
    conflicts.sort_by(|a, b| (a.start_time, &a.session_id).cmp(&(b.start_time, &b.session_id)));
    conflicts
}
