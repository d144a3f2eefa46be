//! UpdateSessionHandler - Command handler for editing a session.

use std::sync::Arc;

use crate::application::handlers::support::{is_slot_taken, scope_conflicts, slot_taken};
use crate::domain::foundation::{EntityKind, SessionId, TutorId};
use crate::domain::scheduling::{
    ConflictOverride, ConflictScope, ConflictingSession, SchedulingError, SchedulingPolicy,
};
use crate::domain::session::{Session, SessionChange, SessionUpdate};
use crate::ports::{Clock, SchedulingStore};

/// Command to apply typed edits to a session.
#[derive(Debug, Clone)]
pub struct UpdateSessionCommand {
    pub session_id: SessionId,
    pub tutor_id: TutorId,
    pub changes: Vec<SessionChange>,
    pub conflict_override: ConflictOverride,
}

/// Result of a session update.
#[derive(Debug, Clone)]
pub struct UpdateSessionResult {
    pub session: Session,
    /// One row per changed column; empty when nothing changed.
    pub updates: Vec<SessionUpdate>,
    pub overridden: Vec<ConflictingSession>,
}

/// Handler for editing sessions.
pub struct UpdateSessionHandler {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
    policy: SchedulingPolicy,
}

impl UpdateSessionHandler {
    pub fn new(
        store: Arc<dyn SchedulingStore>,
        clock: Arc<dyn Clock>,
        policy: SchedulingPolicy,
    ) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: UpdateSessionCommand,
    ) -> Result<UpdateSessionResult, SchedulingError> {
        let now = self.clock.now();
        let today = now.date();

        let mut tx = self.store.begin().await?;
        let current = tx
            .find_session(&cmd.session_id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Session, &cmd.session_id))?;
        current.authorize(&cmd.tutor_id)?;
        if !current.status().is_active() {
            return Err(SchedulingError::not_found(EntityKind::Session, &cmd.session_id));
        }

        let mut session = current.clone();
        let changes =
            session.apply_changes(&cmd.changes, today, self.policy.max_duration_minutes)?;
        if changes.is_empty() {
            return Ok(UpdateSessionResult {
                session,
                updates: Vec::new(),
                overridden: Vec::new(),
            });
        }

        let mut conflicts = Vec::new();
        if session.slot() != current.slot() {
            let scope = ConflictScope::Tutor(cmd.tutor_id.clone());
            conflicts =
                scope_conflicts(tx.as_mut(), &scope, &session.slot(), Some(session.id())).await?;
            if let Err(err) = self
                .policy
                .resolve(&scope, conflicts.clone(), cmd.conflict_override)
            {
                tracing::warn!(session_id = %cmd.session_id, conflicts = conflicts.len(), "Session update rejected: time conflict");
                return Err(err);
            }
        }

        if let Err(err) = tx.update_session(&session).await {
            if is_slot_taken(&err) {
                drop(tx);
                return Err(slot_taken(
                    self.store.as_ref(),
                    &cmd.tutor_id,
                    &session.slot(),
                    Some(session.id()),
                )
                .await);
            }
            return Err(err.into());
        }

        let updates: Vec<SessionUpdate> = changes
            .into_iter()
            .map(|change| SessionUpdate::record(session.id().clone(), change, now))
            .collect();
        for update in &updates {
            tx.insert_session_update(update).await?;
        }
        tx.commit().await?;

        tracing::info!(session_id = %session.id(), fields = updates.len(), "Session updated");

        Ok(UpdateSessionResult {
            session,
            updates,
            overridden: conflicts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::{InMemorySchedulingStore, StoreOperation};
    use crate::application::handlers::session::{CreateSessionCommand, CreateSessionHandler};
    use crate::domain::account::Tutor;
    use crate::domain::foundation::Level;
    use crate::domain::session::{AuditedField, DeliveryMode, SessionDetails};
    use crate::ports::ScheduleReader;
    use chrono::{NaiveDate, NaiveTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn tutor(n: u32) -> TutorId {
        TutorId::new(format!("ttr_{:03}", n)).unwrap()
    }

    struct Fixture {
        store: Arc<InMemorySchedulingStore>,
        create: CreateSessionHandler,
        update: UpdateSessionHandler,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemorySchedulingStore::new());
        for n in 1..=2 {
            store
                .seed_tutor(Tutor {
                    id: tutor(n),
                    name: format!("Tutor {n}"),
                    email: format!("t{n}@example.com"),
                })
                .await
                .unwrap();
        }
        let clock = Arc::new(FixedClock::on(today()));
        Fixture {
            create: CreateSessionHandler::new(store.clone(), clock.clone(), SchedulingPolicy::default()),
            update: UpdateSessionHandler::new(store.clone(), clock, SchedulingPolicy::default()),
            store,
        }
    }

    async fn post(f: &Fixture, start: NaiveTime) -> SessionId {
        f.create
            .handle(CreateSessionCommand {
                tutor_id: tutor(1),
                details: SessionDetails {
                    subject: "Math".into(),
                    topic: "Algebra".into(),
                    level: Level::Beginner,
                    details: String::new(),
                    date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
                    start_time: start,
                    duration_minutes: 60,
                    mode: DeliveryMode::online("https://meet.example/a").unwrap(),
                },
                conflict_override: ConflictOverride::Reject,
            })
            .await
            .unwrap()
            .session
            .id()
            .clone()
    }

    fn edit(id: &SessionId, changes: Vec<SessionChange>) -> UpdateSessionCommand {
        UpdateSessionCommand {
            session_id: id.clone(),
            tutor_id: tutor(1),
            changes,
            conflict_override: ConflictOverride::Reject,
        }
    }

    #[tokio::test]
    async fn start_time_change_is_audited_with_recomputed_end() {
        let f = fixture().await;
        let id = post(&f, at(10, 0)).await;

        let result = f
            .update
            .handle(edit(&id, vec![SessionChange::StartTime(at(13, 0))]))
            .await
            .unwrap();

        assert_eq!(result.session.end_time(), at(14, 0));
        let history = f.store.session_history(&id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].field, AuditedField::StartTime);
        assert_eq!(history[0].old_value.as_deref(), Some("10:00"));
        assert_eq!(history[0].new_value.as_deref(), Some("13:00"));
        assert_eq!(history[1].field, AuditedField::EndTime);
        assert_eq!(history[1].new_value.as_deref(), Some("14:00"));
    }

    #[tokio::test]
    async fn moving_onto_another_session_conflicts() {
        let f = fixture().await;
        let first = post(&f, at(10, 0)).await;
        let second = post(&f, at(12, 0)).await;

        let err = f
            .update
            .handle(edit(&second, vec![SessionChange::StartTime(at(10, 30))]))
            .await
            .unwrap_err();
        match err {
            SchedulingError::Conflict { conflicts } => assert_eq!(conflicts[0].session_id, first),
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(f.store.session_update_count().await, 0);
    }

    #[tokio::test]
    async fn session_never_conflicts_with_itself() {
        let f = fixture().await;
        let id = post(&f, at(10, 0)).await;
        let result = f
            .update
            .handle(edit(&id, vec![SessionChange::Duration(90)]))
            .await
            .unwrap();
        assert!(result.overridden.is_empty());
        assert_eq!(result.session.end_time(), at(11, 30));
    }

    #[tokio::test]
    async fn no_effective_change_writes_nothing() {
        let f = fixture().await;
        let id = post(&f, at(10, 0)).await;
        let result = f
            .update
            .handle(edit(&id, vec![SessionChange::Subject("Math".into())]))
            .await
            .unwrap();
        assert!(result.updates.is_empty());
        assert_eq!(f.store.session_update_count().await, 0);
    }

    #[tokio::test]
    async fn other_tutor_is_forbidden() {
        let f = fixture().await;
        let id = post(&f, at(10, 0)).await;
        let mut cmd = edit(&id, vec![SessionChange::Topic("Geometry".into())]);
        cmd.tutor_id = tutor(2);
        assert!(matches!(
            f.update.handle(cmd).await.unwrap_err(),
            SchedulingError::Forbidden(_)
        ));
    }

    #[tokio::test]
    async fn missing_session_is_not_found() {
        let f = fixture().await;
        let err = f
            .update
            .handle(edit(&SessionId::new("sess_404").unwrap(), vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound { entity: EntityKind::Session, .. }));
    }

    #[tokio::test]
    async fn failed_audit_write_rolls_back_the_edit() {
        let f = fixture().await;
        let id = post(&f, at(10, 0)).await;
        f.store.fail_on_nth(StoreOperation::InsertSessionUpdate, 2);

        assert!(f
            .update
            .handle(edit(&id, vec![SessionChange::StartTime(at(15, 0))]))
            .await
            .is_err());

        let listing = f.store.get_session(&id).await.unwrap().unwrap();
        assert_eq!(listing.session.start_time(), at(10, 0));
        assert_eq!(f.store.session_update_count().await, 0);
    }
}
