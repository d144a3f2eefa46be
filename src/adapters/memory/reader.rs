//! `ScheduleReader` over the in-memory state.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::cmp::Reverse;

use super::store::{InMemorySchedulingStore, StoreState};
use crate::domain::foundation::{DomainError, SessionId, StudentId, TutorId};
use crate::domain::registration::Cancellation;
use crate::domain::session::{Session, SessionUpdate};
use crate::ports::{
    PendingRequestView, RosterEntry, ScheduleReader, ScheduledSessionView, SessionListing,
};

impl StoreState {
    fn listing(&self, session: &Session) -> SessionListing {
        let tutor_name = self
            .tutors
            .get(session.tutor_id())
            .map(|t| t.name.clone())
            .unwrap_or_default();
        let active_registrations = self
            .registrations
            .values()
            .filter(|r| r.session_id() == session.id() && r.status().is_active())
            .count() as u32;
        SessionListing {
            session: session.clone(),
            tutor_name,
            active_registrations,
        }
    }

    fn history(&self, session_id: &SessionId) -> Vec<SessionUpdate> {
        self.session_updates
            .iter()
            .filter(|u| &u.session_id == session_id)
            .cloned()
            .collect()
    }
}

fn by_date_and_start(a: &Session, b: &Session) -> std::cmp::Ordering {
    (a.date(), a.start_time(), a.id()).cmp(&(b.date(), b.start_time(), b.id()))
}

#[async_trait]
impl ScheduleReader for InMemorySchedulingStore {
    async fn available_sessions(&self, today: NaiveDate) -> Result<Vec<SessionListing>, DomainError> {
        let state = self.state.lock().await;
        let mut sessions: Vec<&Session> = state
            .sessions
            .values()
            .filter(|s| s.is_bookable(today))
            .collect();
        sessions.sort_by(|a, b| by_date_and_start(a, b));
        Ok(sessions.into_iter().map(|s| state.listing(s)).collect())
    }

    async fn tutor_sessions(
        &self,
        tutor_id: &TutorId,
        today: NaiveDate,
    ) -> Result<Vec<SessionListing>, DomainError> {
        let state = self.state.lock().await;
        let mut sessions: Vec<&Session> = state
            .sessions
            .values()
            .filter(|s| s.tutor_id() == tutor_id && s.is_bookable(today))
            .collect();
        sessions.sort_by(|a, b| by_date_and_start(a, b));
        Ok(sessions.into_iter().map(|s| state.listing(s)).collect())
    }

    async fn get_session(&self, id: &SessionId) -> Result<Option<SessionListing>, DomainError> {
        let state = self.state.lock().await;
        Ok(state.sessions.get(id).map(|s| state.listing(s)))
    }

    async fn pending_requests(&self, viewer: &StudentId) -> Result<Vec<PendingRequestView>, DomainError> {
        let state = self.state.lock().await;
        let mut views: Vec<PendingRequestView> = state
            .requests
            .values()
            .filter(|r| r.status().is_pending())
            .map(|r| {
                let participants: Vec<_> = state
                    .participations
                    .iter()
                    .filter(|p| &p.request_id == r.id())
                    .collect();
                PendingRequestView {
                    request: r.clone(),
                    participant_count: participants.len() as u32,
                    viewer_participates: participants.iter().any(|p| &p.student_id == viewer),
                }
            })
            .collect();
        views.sort_by_key(|v| Reverse((v.request.created_on(), v.request.id().clone())));
        Ok(views)
    }

    async fn student_schedule(
        &self,
        student_id: &StudentId,
        today: NaiveDate,
    ) -> Result<Vec<ScheduledSessionView>, DomainError> {
        let state = self.state.lock().await;
        let mut views: Vec<ScheduledSessionView> = state
            .registrations
            .values()
            .filter(|r| r.student_id() == student_id && r.status().is_active())
            .filter_map(|r| {
                let session = state.sessions.get(r.session_id())?;
                if !session.is_bookable(today) {
                    return None;
                }
                Some(ScheduledSessionView {
                    session: session.clone(),
                    tutor_name: state.listing(session).tutor_name,
                    registered_on: r.registered_on(),
                    updates: state.history(session.id()),
                })
            })
            .collect();
        views.sort_by(|a, b| by_date_and_start(&a.session, &b.session));
        Ok(views)
    }

    async fn session_history(&self, session_id: &SessionId) -> Result<Vec<SessionUpdate>, DomainError> {
        Ok(self.state.lock().await.history(session_id))
    }

    async fn session_cancellations(
        &self,
        session_id: &SessionId,
    ) -> Result<Vec<Cancellation>, DomainError> {
        Ok(self
            .state
            .lock()
            .await
            .cancellations
            .iter()
            .filter(|c| &c.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn session_roster(&self, session_id: &SessionId) -> Result<Vec<RosterEntry>, DomainError> {
        let state = self.state.lock().await;
        let mut roster: Vec<RosterEntry> = state
            .registrations
            .values()
            .filter(|r| r.session_id() == session_id && r.status().is_active())
            .filter_map(|r| {
                let student = state.students.get(r.student_id())?;
                Some(RosterEntry {
                    registration: r.clone(),
                    student: student.clone(),
                })
            })
            .collect();
        roster.sort_by(|a, b| {
            (a.registration.registered_on(), a.registration.id())
                .cmp(&(b.registration.registered_on(), b.registration.id()))
        });
        Ok(roster)
    }
}
