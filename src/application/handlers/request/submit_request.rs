//! SubmitRequestHandler - Command handler for topic requests.
//!
//! A submission either joins the matching pending request or opens a new
//! one. Matching is case-insensitive on subject and topic and exact on
//! level, so duplicate interest collapses into one request with several
//! participants.

use std::sync::Arc;

use crate::application::handlers::support::next_id;
use crate::domain::foundation::{EntityKind, ErrorCode, RequestId, StudentId};
use crate::domain::request::{JoinOutcome, RequestParticipation, RequestTopic, SessionRequest};
use crate::domain::scheduling::{SchedulingError, SchedulingPolicy};
use crate::ports::{Clock, SchedulingStore, SchedulingTransaction};

/// Command to submit interest in a topic.
#[derive(Debug, Clone)]
pub struct SubmitRequestCommand {
    pub student_id: StudentId,
    pub topic: RequestTopic,
}

/// Command to join a listed pending request.
#[derive(Debug, Clone)]
pub struct JoinRequestCommand {
    pub student_id: StudentId,
    pub request_id: RequestId,
}

/// Result of submitting or joining a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParticipationResult {
    pub request_id: RequestId,
    pub outcome: JoinOutcome,
    pub participant_count: u32,
}

/// Handler for submitting and joining requests.
pub struct SubmitRequestHandler {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
    policy: SchedulingPolicy,
}

impl SubmitRequestHandler {
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

    /// Joins the matching pending request, or opens a new one.
    ///
    /// A concurrent submission of the same topic can win the race to create
    /// the request; the loser retries once and joins it instead.
    pub async fn submit(
        &self,
        cmd: SubmitRequestCommand,
    ) -> Result<RequestParticipationResult, SchedulingError> {
        let topic = cmd.topic.normalized()?;
        for attempt in 1..=2 {
            match self.try_submit(&cmd.student_id, &topic).await? {
                Some(result) => return Ok(result),
                None => {
                    tracing::warn!(
                        student_id = %cmd.student_id,
                        attempt,
                        "Matching request created concurrently, retrying as join"
                    );
                }
            }
        }
        Err(SchedulingError::Store(
            "Request creation kept racing with concurrent submissions".to_string(),
        ))
    }

    /// Joins a pending request by id.
    pub async fn join(
        &self,
        cmd: JoinRequestCommand,
    ) -> Result<RequestParticipationResult, SchedulingError> {
        let mut tx = self.store.begin().await?;
        ensure_student(tx.as_mut(), &cmd.student_id).await?;
        let request = tx
            .find_request(&cmd.request_id)
            .await?
            .filter(|r| r.status().is_pending())
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Request, &cmd.request_id))?;

        let result = self.participate(tx.as_mut(), &request, &cmd.student_id).await?;
        tx.commit().await?;
        log_outcome(&cmd.student_id, &result);
        Ok(result)
    }

    /// One attempt. `None` means a matching request appeared between the
    /// lookup and the insert.
    async fn try_submit(
        &self,
        student_id: &StudentId,
        topic: &RequestTopic,
    ) -> Result<Option<RequestParticipationResult>, SchedulingError> {
        let mut tx = self.store.begin().await?;
        ensure_student(tx.as_mut(), student_id).await?;

        let existing = tx
            .find_pending_request(&topic.subject, &topic.topic, topic.level)
            .await?;
        if let Some(request) = existing {
            let result = self.participate(tx.as_mut(), &request, student_id).await?;
            tx.commit().await?;
            log_outcome(student_id, &result);
            return Ok(Some(result));
        }

        let today = self.clock.today();
        let id = next_id(tx.as_mut(), self.policy.identifiers(), EntityKind::Request).await?;
        let request = SessionRequest::new(
            RequestId::new(id)?,
            student_id.clone(),
            topic.clone(),
            today,
        )?;
        match tx.insert_request(&request).await {
            Err(err) if err.code == ErrorCode::DuplicateRequest => return Ok(None),
            other => other?,
        }
        tx.insert_participation(&RequestParticipation {
            request_id: request.id().clone(),
            student_id: student_id.clone(),
            joined_on: today,
        })
        .await?;
        tx.commit().await?;

        let result = RequestParticipationResult {
            request_id: request.id().clone(),
            outcome: JoinOutcome::Created,
            participant_count: 1,
        };
        log_outcome(student_id, &result);
        Ok(Some(result))
    }

    async fn participate(
        &self,
        tx: &mut dyn SchedulingTransaction,
        request: &SessionRequest,
        student_id: &StudentId,
    ) -> Result<RequestParticipationResult, SchedulingError> {
        let inserted = tx
            .insert_participation(&RequestParticipation {
                request_id: request.id().clone(),
                student_id: student_id.clone(),
                joined_on: self.clock.today(),
            })
            .await?;
        let participant_count = tx.participants(request.id()).await?.len() as u32;
        Ok(RequestParticipationResult {
            request_id: request.id().clone(),
            outcome: if inserted {
                JoinOutcome::Joined
            } else {
                JoinOutcome::AlreadyParticipating
            },
            participant_count,
        })
    }
}

async fn ensure_student(
    tx: &mut dyn SchedulingTransaction,
    student_id: &StudentId,
) -> Result<(), SchedulingError> {
    match tx.find_student(student_id).await? {
        Some(_) => Ok(()),
        None => Err(SchedulingError::not_found(EntityKind::Student, student_id)),
    }
}

fn log_outcome(student_id: &StudentId, result: &RequestParticipationResult) {
    tracing::info!(
        student_id = %student_id,
        request_id = %result.request_id,
        outcome = ?result.outcome,
        participants = result.participant_count,
        "Request participation recorded"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::{InMemorySchedulingStore, StoreOperation};
    use crate::domain::account::Student;
    use crate::domain::foundation::Level;
    use chrono::NaiveDate;

    fn student(n: u32) -> StudentId {
        StudentId::new(format!("st_{:03}", n)).unwrap()
    }

    async fn setup() -> (Arc<InMemorySchedulingStore>, SubmitRequestHandler) {
        let store = Arc::new(InMemorySchedulingStore::new());
        for n in 1..=3 {
            store
                .seed_student(Student {
                    id: student(n),
                    name: format!("Student {n}"),
                    email: format!("s{n}@example.com"),
                })
                .await
                .unwrap();
        }
        let clock = Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()));
        let handler = SubmitRequestHandler::new(store.clone(), clock, SchedulingPolicy::default());
        (store, handler)
    }

    fn submit(n: u32, subject: &str, topic: &str, level: Level) -> SubmitRequestCommand {
        SubmitRequestCommand {
            student_id: student(n),
            topic: RequestTopic {
                subject: subject.into(),
                topic: topic.into(),
                level,
                details: String::new(),
            },
        }
    }

    #[tokio::test]
    async fn first_submission_creates_request() {
        let (_, handler) = setup().await;
        let result = handler
            .submit(submit(1, "Math", "Algebra", Level::Beginner))
            .await
            .unwrap();
        assert_eq!(result.outcome, JoinOutcome::Created);
        assert_eq!(result.request_id.as_str(), "req_001");
        assert_eq!(result.participant_count, 1);
    }

    #[tokio::test]
    async fn matching_submission_joins_case_insensitively() {
        let (_, handler) = setup().await;
        let first = handler
            .submit(submit(1, "Math", "Algebra", Level::Beginner))
            .await
            .unwrap();
        let second = handler
            .submit(submit(2, "math", "ALGEBRA", Level::Beginner))
            .await
            .unwrap();
        assert_eq!(second.request_id, first.request_id);
        assert_eq!(second.outcome, JoinOutcome::Joined);
        assert_eq!(second.participant_count, 2);
    }

    #[tokio::test]
    async fn different_level_opens_a_new_request() {
        let (_, handler) = setup().await;
        handler
            .submit(submit(1, "Math", "Algebra", Level::Beginner))
            .await
            .unwrap();
        let other = handler
            .submit(submit(2, "Math", "Algebra", Level::Advanced))
            .await
            .unwrap();
        assert_eq!(other.outcome, JoinOutcome::Created);
        assert_eq!(other.request_id.as_str(), "req_002");
    }

    #[tokio::test]
    async fn resubmitting_is_idempotent() {
        let (store, handler) = setup().await;
        let first = handler
            .submit(submit(1, "Math", "Algebra", Level::Beginner))
            .await
            .unwrap();
        let again = handler
            .submit(submit(1, "Math", "Algebra", Level::Beginner))
            .await
            .unwrap();
        assert_eq!(again.outcome, JoinOutcome::AlreadyParticipating);
        assert_eq!(store.participation_count(&first.request_id).await, 1);
    }

    #[tokio::test]
    async fn join_by_id_adds_participant() {
        let (_, handler) = setup().await;
        let created = handler
            .submit(submit(1, "Biology", "Cells", Level::Intermediate))
            .await
            .unwrap();
        let joined = handler
            .join(JoinRequestCommand {
                student_id: student(3),
                request_id: created.request_id.clone(),
            })
            .await
            .unwrap();
        assert_eq!(joined.outcome, JoinOutcome::Joined);
        assert_eq!(joined.participant_count, 2);
    }

    #[tokio::test]
    async fn joining_unknown_request_is_not_found() {
        let (_, handler) = setup().await;
        let err = handler
            .join(JoinRequestCommand {
                student_id: student(1),
                request_id: RequestId::new("req_042").unwrap(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound { entity: EntityKind::Request, .. }));
    }

    #[tokio::test]
    async fn unknown_student_is_not_found() {
        let (_, handler) = setup().await;
        let err = handler
            .submit(submit(9, "Math", "Algebra", Level::Beginner))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound { entity: EntityKind::Student, .. }));
    }

    #[tokio::test]
    async fn failed_participation_insert_leaves_no_request() {
        let (store, handler) = setup().await;
        store.fail_on(StoreOperation::InsertParticipation);
        assert!(handler
            .submit(submit(1, "Math", "Algebra", Level::Beginner))
            .await
            .is_err());
        assert!(store.request(&RequestId::new("req_001").unwrap()).await.is_none());
    }
}
