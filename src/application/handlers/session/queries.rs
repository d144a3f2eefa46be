//! SessionQueryHandler - Query handler for session listings and history.

use std::sync::Arc;

use crate::domain::foundation::{EntityKind, SessionId, TutorId};
use crate::domain::registration::Cancellation;
use crate::domain::scheduling::SchedulingError;
use crate::domain::session::SessionUpdate;
use crate::ports::{Clock, RosterEntry, ScheduleReader, SessionListing};

/// Handler for read-only session queries.
pub struct SessionQueryHandler {
    reader: Arc<dyn ScheduleReader>,
    clock: Arc<dyn Clock>,
}

impl SessionQueryHandler {
    pub fn new(reader: Arc<dyn ScheduleReader>, clock: Arc<dyn Clock>) -> Self {
        Self { reader, clock }
    }

    /// Bookable sessions: active and dated today or later.
    pub async fn available_sessions(&self) -> Result<Vec<SessionListing>, SchedulingError> {
        Ok(self.reader.available_sessions(self.clock.today()).await?)
    }

    /// The tutor's own upcoming active sessions.
    pub async fn tutor_sessions(&self, tutor_id: &TutorId) -> Result<Vec<SessionListing>, SchedulingError> {
        Ok(self
            .reader
            .tutor_sessions(tutor_id, self.clock.today())
            .await?)
    }

    pub async fn get_session(&self, session_id: &SessionId) -> Result<SessionListing, SchedulingError> {
        self.reader
            .get_session(session_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Session, session_id))
    }

    /// Field-level update history, oldest first.
    pub async fn session_history(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<SessionUpdate>, SchedulingError> {
        self.get_session(session_id).await?;
        Ok(self.reader.session_history(session_id).await?)
    }

    /// Cancellations of a session. Only its tutor may see them.
    pub async fn session_cancellations(
        &self,
        session_id: &SessionId,
        tutor_id: &TutorId,
    ) -> Result<Vec<Cancellation>, SchedulingError> {
        self.owned_session(session_id, tutor_id).await?;
        Ok(self.reader.session_cancellations(session_id).await?)
    }

    /// Students currently registered for a session. Only its tutor may see them.
    pub async fn session_roster(
        &self,
        session_id: &SessionId,
        tutor_id: &TutorId,
    ) -> Result<Vec<RosterEntry>, SchedulingError> {
        self.owned_session(session_id, tutor_id).await?;
        Ok(self.reader.session_roster(session_id).await?)
    }

    async fn owned_session(
        &self,
        session_id: &SessionId,
        tutor_id: &TutorId,
    ) -> Result<SessionListing, SchedulingError> {
        let listing = self.get_session(session_id).await?;
        listing.session.authorize(tutor_id)?;
        Ok(listing)
    }
}
