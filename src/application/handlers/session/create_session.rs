//! CreateSessionHandler - Command handler for posting new sessions.

use std::sync::Arc;

use crate::application::handlers::support::{is_slot_taken, next_id, scope_conflicts, slot_taken};
use crate::domain::foundation::{EntityKind, SessionId, TutorId};
use crate::domain::scheduling::{
    ConflictOverride, ConflictScope, ConflictingSession, SchedulingError, SchedulingPolicy,
};
use crate::domain::session::{Session, SessionDetails};
use crate::ports::{Clock, SchedulingStore};

/// Command to post a new session.
#[derive(Debug, Clone)]
pub struct CreateSessionCommand {
    pub tutor_id: TutorId,
    pub details: SessionDetails,
    pub conflict_override: ConflictOverride,
}

/// Result of successful session creation.
#[derive(Debug, Clone)]
pub struct CreateSessionResult {
    pub session: Session,
    /// Conflicts the tutor chose to override, if any.
    pub overridden: Vec<ConflictingSession>,
}

/// Handler for posting sessions.
pub struct CreateSessionHandler {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
    policy: SchedulingPolicy,
}

impl CreateSessionHandler {
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
        cmd: CreateSessionCommand,
    ) -> Result<CreateSessionResult, SchedulingError> {
        let today = self.clock.today();
        let slot = cmd
            .details
            .time_slot(today, self.policy.max_duration_minutes)?;

        let mut tx = self.store.begin().await?;
        if tx.find_tutor(&cmd.tutor_id).await?.is_none() {
            return Err(SchedulingError::not_found(EntityKind::Tutor, &cmd.tutor_id));
        }

        // 1. Tutor-scope conflict check
        let scope = ConflictScope::Tutor(cmd.tutor_id.clone());
        let conflicts = scope_conflicts(tx.as_mut(), &scope, &slot, None).await?;
        if let Err(err) = self
            .policy
            .resolve(&scope, conflicts.clone(), cmd.conflict_override)
        {
            tracing::warn!(tutor_id = %cmd.tutor_id, conflicts = conflicts.len(), "Session rejected: time conflict");
            return Err(err);
        }

        // 2. Allocate id and insert
        let id = next_id(tx.as_mut(), self.policy.identifiers(), EntityKind::Session).await?;
        let session = Session::new(
            SessionId::new(id)?,
            cmd.tutor_id.clone(),
            cmd.details,
            today,
            self.policy.max_duration_minutes,
        )?;

        if let Err(err) = tx.insert_session(&session).await {
            if is_slot_taken(&err) {
                drop(tx);
                return Err(slot_taken(self.store.as_ref(), &cmd.tutor_id, &slot, None).await);
            }
            return Err(err.into());
        }

        tx.commit().await?;

        if !conflicts.is_empty() {
            tracing::warn!(
                session_id = %session.id(),
                conflicts = conflicts.len(),
                "Session created over tutor conflicts by explicit override"
            );
        }
        tracing::info!(session_id = %session.id(), tutor_id = %cmd.tutor_id, date = %session.date(), "Session created");

        Ok(CreateSessionResult {
            session,
            overridden: conflicts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::{InMemorySchedulingStore, StoreOperation};
    use crate::domain::account::Tutor;
    use crate::domain::foundation::Level;
    use crate::domain::session::DeliveryMode;
    use chrono::{NaiveDate, NaiveTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()
    }

    fn tutor_id() -> TutorId {
        TutorId::new("ttr_001").unwrap()
    }

    fn details(h: u32, m: u32, minutes: u32) -> SessionDetails {
        SessionDetails {
            subject: "Math".into(),
            topic: "Algebra".into(),
            level: Level::Beginner,
            details: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
            start_time: NaiveTime::from_hms_opt(h, m, 0).unwrap(),
            duration_minutes: minutes,
            mode: DeliveryMode::in_person("Room 1").unwrap(),
        }
    }

    fn command(h: u32, m: u32, minutes: u32, choice: ConflictOverride) -> CreateSessionCommand {
        CreateSessionCommand {
            tutor_id: tutor_id(),
            details: details(h, m, minutes),
            conflict_override: choice,
        }
    }

    async fn setup(policy: SchedulingPolicy) -> (Arc<InMemorySchedulingStore>, CreateSessionHandler) {
        let store = Arc::new(InMemorySchedulingStore::new());
        store
            .seed_tutor(Tutor {
                id: tutor_id(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
            })
            .await
            .unwrap();
        let handler =
            CreateSessionHandler::new(store.clone(), Arc::new(FixedClock::on(today())), policy);
        (store, handler)
    }

    #[tokio::test]
    async fn first_session_gets_first_id() {
        let (_, handler) = setup(SchedulingPolicy::default()).await;
        let result = handler
            .handle(command(10, 0, 60, ConflictOverride::Reject))
            .await
            .unwrap();
        assert_eq!(result.session.id().as_str(), "sess_001");
        assert!(result.overridden.is_empty());
    }

    #[tokio::test]
    async fn overlapping_session_is_rejected_with_conflicts() {
        let (store, handler) = setup(SchedulingPolicy::default()).await;
        handler
            .handle(command(10, 0, 60, ConflictOverride::Reject))
            .await
            .unwrap();

        let err = handler
            .handle(command(10, 30, 30, ConflictOverride::Reject))
            .await
            .unwrap_err();
        match err {
            SchedulingError::Conflict { conflicts } => {
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].session_id.as_str(), "sess_001");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn override_creates_overlapping_session() {
        let (store, handler) = setup(SchedulingPolicy::default()).await;
        handler
            .handle(command(10, 0, 60, ConflictOverride::Reject))
            .await
            .unwrap();
        let result = handler
            .handle(command(10, 30, 30, ConflictOverride::Proceed))
            .await
            .unwrap();
        assert_eq!(result.overridden.len(), 1);
        assert_eq!(store.session_count().await, 2);
    }

    #[tokio::test]
    async fn identical_start_is_rejected_even_with_override() {
        let (store, handler) = setup(SchedulingPolicy::default()).await;
        handler
            .handle(command(10, 0, 60, ConflictOverride::Reject))
            .await
            .unwrap();
        let err = handler
            .handle(command(10, 0, 30, ConflictOverride::Proceed))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Conflict { ref conflicts } if conflicts.len() == 1));
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn strict_policy_refuses_override() {
        let strict = SchedulingPolicy {
            allow_tutor_override: false,
            ..SchedulingPolicy::default()
        };
        let (_, handler) = setup(strict).await;
        handler
            .handle(command(10, 0, 60, ConflictOverride::Reject))
            .await
            .unwrap();
        assert!(handler
            .handle(command(10, 30, 30, ConflictOverride::Proceed))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn unknown_tutor_is_not_found() {
        let (_, handler) = setup(SchedulingPolicy::default()).await;
        let mut cmd = command(10, 0, 60, ConflictOverride::Reject);
        cmd.tutor_id = TutorId::new("ttr_009").unwrap();
        let err = handler.handle(cmd).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound { entity: EntityKind::Tutor, .. }));
    }

    #[tokio::test]
    async fn past_date_is_a_validation_error() {
        let (_, handler) = setup(SchedulingPolicy::default()).await;
        let mut cmd = command(10, 0, 60, ConflictOverride::Reject);
        cmd.details.date = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
        let err = handler.handle(cmd).await.unwrap_err();
        assert!(matches!(err, SchedulingError::Validation { ref field, .. } if field == "date"));
    }

    #[tokio::test]
    async fn exhausted_identifiers_fail_without_writing() {
        let narrow = SchedulingPolicy {
            identifier_width: 1,
            ..SchedulingPolicy::default()
        };
        let (store, handler) = setup(narrow).await;
        for hour in 8..17 {
            handler
                .handle(command(hour, 0, 30, ConflictOverride::Reject))
                .await
                .unwrap();
        }
        let err = handler
            .handle(command(18, 0, 30, ConflictOverride::Reject))
            .await
            .unwrap_err();
        assert_eq!(err, SchedulingError::IdentifierExhausted(EntityKind::Session));
        assert_eq!(store.session_count().await, 9);
    }

    #[tokio::test]
    async fn store_failure_leaves_nothing_behind() {
        let (store, handler) = setup(SchedulingPolicy::default()).await;
        store.fail_on(StoreOperation::Commit);
        let err = handler
            .handle(command(10, 0, 60, ConflictOverride::Reject))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::Store(_)));
        assert_eq!(store.session_count().await, 0);
    }
}
