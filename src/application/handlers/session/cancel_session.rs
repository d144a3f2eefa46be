//! CancelSessionHandler - Command handler for withdrawing a session.

use std::sync::Arc;

use crate::domain::foundation::{EntityKind, SessionId, TutorId};
use crate::domain::scheduling::SchedulingError;
use crate::domain::session::{Session, SessionUpdate};
use crate::ports::{Clock, SchedulingStore};

/// Command to cancel a session.
#[derive(Debug, Clone)]
pub struct CancelSessionCommand {
    pub session_id: SessionId,
    pub tutor_id: TutorId,
}

/// Result of a session cancellation.
#[derive(Debug, Clone)]
pub struct CancelSessionResult {
    pub session: Session,
    pub update: SessionUpdate,
}

/// Handler for cancelling sessions.
///
/// Registrations are left untouched as history; the session simply stops
/// being bookable and stops blocking its slot.
pub struct CancelSessionHandler {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
}

impl CancelSessionHandler {
    pub fn new(store: Arc<dyn SchedulingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn handle(
        &self,
        cmd: CancelSessionCommand,
    ) -> Result<CancelSessionResult, SchedulingError> {
        let mut tx = self.store.begin().await?;
        let mut session = tx
            .find_session(&cmd.session_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Session, &cmd.session_id))?;
        session.authorize(&cmd.tutor_id)?;
        if !session.status().is_active() {
            return Err(SchedulingError::not_found(EntityKind::Session, &cmd.session_id));
        }

        let change = session.cancel()?;
        let update = SessionUpdate::record(session.id().clone(), change, self.clock.now());
        tx.update_session(&session).await?;
        tx.insert_session_update(&update).await?;
        tx.commit().await?;

        tracing::info!(session_id = %session.id(), tutor_id = %cmd.tutor_id, "Session cancelled");

        Ok(CancelSessionResult { session, update })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::InMemorySchedulingStore;
    use crate::application::handlers::session::{CreateSessionCommand, CreateSessionHandler};
    use crate::domain::account::Tutor;
    use crate::domain::foundation::{Level, SessionStatus};
    use crate::domain::scheduling::{ConflictOverride, SchedulingPolicy};
    use crate::domain::session::{AuditedField, DeliveryMode, SessionDetails};
    use crate::ports::ScheduleReader;
    use chrono::{NaiveDate, NaiveTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()
    }

    async fn posted() -> (Arc<InMemorySchedulingStore>, CancelSessionHandler, CreateSessionHandler, SessionId) {
        let store = Arc::new(InMemorySchedulingStore::new());
        store
            .seed_tutor(Tutor {
                id: TutorId::new("ttr_001").unwrap(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
            })
            .await
            .unwrap();
        let clock = Arc::new(FixedClock::on(today()));
        let create =
            CreateSessionHandler::new(store.clone(), clock.clone(), SchedulingPolicy::default());
        let id = create
            .handle(CreateSessionCommand {
                tutor_id: TutorId::new("ttr_001").unwrap(),
                details: SessionDetails {
                    subject: "Physics".into(),
                    topic: "Optics".into(),
                    level: Level::Advanced,
                    details: String::new(),
                    date: today(),
                    start_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
                    duration_minutes: 45,
                    mode: DeliveryMode::in_person("Lab 3").unwrap(),
                },
                conflict_override: ConflictOverride::Reject,
            })
            .await
            .unwrap()
            .session
            .id()
            .clone();
        (store.clone(), CancelSessionHandler::new(store, clock), create, id)
    }

    fn cancel(id: &SessionId, tutor: &str) -> CancelSessionCommand {
        CancelSessionCommand {
            session_id: id.clone(),
            tutor_id: TutorId::new(tutor).unwrap(),
        }
    }

    #[tokio::test]
    async fn cancel_marks_session_and_audits_status() {
        let (store, handler, _, id) = posted().await;
        let result = handler.handle(cancel(&id, "ttr_001")).await.unwrap();

        assert_eq!(result.session.status(), SessionStatus::Cancelled);
        let history = store.session_history(&id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].field, AuditedField::Status);
        assert!(store.available_sessions(today()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cancelled_slot_can_be_reused() {
        let (_, handler, create, id) = posted().await;
        handler.handle(cancel(&id, "ttr_001")).await.unwrap();

        let again = create
            .handle(CreateSessionCommand {
                tutor_id: TutorId::new("ttr_001").unwrap(),
                details: SessionDetails {
                    subject: "Physics".into(),
                    topic: "Optics".into(),
                    level: Level::Advanced,
                    details: String::new(),
                    date: today(),
                    start_time: NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
                    duration_minutes: 45,
                    mode: DeliveryMode::in_person("Lab 3").unwrap(),
                },
                conflict_override: ConflictOverride::Reject,
            })
            .await;
        assert!(again.is_ok());
    }

    #[tokio::test]
    async fn second_cancel_is_not_found() {
        let (_, handler, _, id) = posted().await;
        handler.handle(cancel(&id, "ttr_001")).await.unwrap();
        let err = handler.handle(cancel(&id, "ttr_001")).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound { .. }));
    }

    #[tokio::test]
    async fn non_owner_cannot_cancel() {
        let (_, handler, _, id) = posted().await;
        let err = handler.handle(cancel(&id, "ttr_002")).await.unwrap_err();
        assert!(matches!(err, SchedulingError::Forbidden(_)));
    }
}
