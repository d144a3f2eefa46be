//! Schedule reader port (read side / CQRS queries).
//!
//! Read-only views for listing screens. Reads run outside engine
//! transactions and may observe any committed state.

use crate::domain::account::Student;
use crate::domain::foundation::{DomainError, SessionId, StudentId, TutorId};
use crate::domain::registration::{Cancellation, Registration};
use crate::domain::request::SessionRequest;
use crate::domain::session::{Session, SessionUpdate};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Reader port for schedule queries.
#[async_trait]
pub trait ScheduleReader: Send + Sync {
    /// Active sessions dated `today` or later, ordered by date and start.
    async fn available_sessions(&self, today: NaiveDate) -> Result<Vec<SessionListing>, DomainError>;

    /// The tutor's active sessions dated `today` or later.
    async fn tutor_sessions(
        &self,
        tutor_id: &TutorId,
        today: NaiveDate,
    ) -> Result<Vec<SessionListing>, DomainError>;

    /// Any session by id, whatever its status.
    async fn get_session(&self, id: &SessionId) -> Result<Option<SessionListing>, DomainError>;

    /// Pending requests, newest first.
    async fn pending_requests(&self, viewer: &StudentId) -> Result<Vec<PendingRequestView>, DomainError>;

    /// Upcoming active sessions the student is registered for.
    async fn student_schedule(
        &self,
        student_id: &StudentId,
        today: NaiveDate,
    ) -> Result<Vec<ScheduledSessionView>, DomainError>;

    /// Update history of a session in the order it was written.
    async fn session_history(&self, session_id: &SessionId) -> Result<Vec<SessionUpdate>, DomainError>;

    /// Cancellations recorded against a session, oldest first.
    async fn session_cancellations(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<Cancellation>, DomainError>;

    /// Active registrations of a session with the registered students.
    async fn session_roster(&self, session_id: &SessionId) -> Result<Vec<RosterEntry>, DomainError>;
}

/// A session with its tutor's name and seat count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionListing {
    pub session: Session,
    pub tutor_name: String,
    pub active_registrations: u32,
}

/// A pending request as a particular student sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequestView {
    pub request: SessionRequest,
    pub participant_count: u32,
    pub viewer_participates: bool,
}

/// A session on a student's schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledSessionView {
    pub session: Session,
    pub tutor_name: String,
    pub registered_on: NaiveDate,
    pub updates: Vec<SessionUpdate>,
}

/// One registered student of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub registration: Registration,
    pub student: Student,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_reader_is_object_safe() {
        fn _accepts_dyn(_reader: &dyn ScheduleReader) {}
    }
}
