//! FulfillRequestHandler - Command handler for turning a request into a session.
//!
//! Fulfillment is all-or-nothing: the session, the request's status change
//! and one registration per participant commit together or not at all.

use std::sync::Arc;

use crate::application::handlers::support::{is_slot_taken, next_id, scope_conflicts, slot_taken};
use crate::domain::foundation::{EntityKind, RegistrationId, RequestId, SessionId, TutorId};
use crate::domain::registration::Registration;
use crate::domain::scheduling::{
    ConflictOverride, ConflictScope, ConflictingSession, SchedulingError, SchedulingPolicy,
};
use crate::domain::session::{Session, SessionSchedule};
use crate::ports::{Clock, SchedulingStore};

/// Command to fulfill a pending request with a concrete session.
///
/// Only the schedule is supplied; the topic is taken from the request.
#[derive(Debug, Clone)]
pub struct FulfillRequestCommand {
    pub request_id: RequestId,
    pub tutor_id: TutorId,
    pub schedule: SessionSchedule,
    pub conflict_override: ConflictOverride,
}

/// Result of a fulfillment.
#[derive(Debug, Clone)]
pub struct FulfillRequestResult {
    pub session: Session,
    pub registrations: Vec<Registration>,
    pub overridden: Vec<ConflictingSession>,
}

impl FulfillRequestResult {
    pub fn participant_count(&self) -> usize {
        self.registrations.len()
    }
}

/// Handler for fulfilling requests.
pub struct FulfillRequestHandler {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
    policy: SchedulingPolicy,
}

impl FulfillRequestHandler {
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
        cmd: FulfillRequestCommand,
    ) -> Result<FulfillRequestResult, SchedulingError> {
        let today = self.clock.today();
        let slot = cmd
            .schedule
            .time_slot(today, self.policy.max_duration_minutes)?;

        let mut tx = self.store.begin().await?;
        if tx.find_tutor(&cmd.tutor_id).await?.is_none() {
            return Err(SchedulingError::not_found(EntityKind::Tutor, &cmd.tutor_id));
        }
        let mut request = tx
            .find_request(&cmd.request_id)
            .await?
            .filter(|r| r.status().is_pending())
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Request, &cmd.request_id))?;

        let scope = ConflictScope::Tutor(cmd.tutor_id.clone());
        let conflicts = scope_conflicts(tx.as_mut(), &scope, &slot, None).await?;
        if let Err(err) = self
            .policy
            .resolve(&scope, conflicts.clone(), cmd.conflict_override)
        {
            tracing::warn!(
                request_id = %cmd.request_id,
                tutor_id = %cmd.tutor_id,
                conflicts = conflicts.len(),
                "Fulfillment rejected: time conflict"
            );
            return Err(err);
        }

        let id = next_id(tx.as_mut(), self.policy.identifiers(), EntityKind::Session).await?;
        let details = cmd.schedule.for_topic(
            request.subject(),
            request.topic(),
            request.level(),
            request.details(),
        );
        let session = Session::from_request(
            SessionId::new(id)?,
            cmd.tutor_id.clone(),
            details,
            request.id().clone(),
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

        request.fulfill()?;
        tx.update_request(&request).await?;

        let participants = tx.participants(request.id()).await?;
        let mut registrations = Vec::with_capacity(participants.len());
        for participant in participants {
            let id =
                next_id(tx.as_mut(), self.policy.identifiers(), EntityKind::Registration).await?;
            let registration = Registration::new(
                RegistrationId::new(id)?,
                participant.student_id,
                session.id().clone(),
                request.created_on(),
            );
            tx.insert_registration(&registration).await?;
            registrations.push(registration);
        }

        tx.commit().await?;

        tracing::info!(
            request_id = %request.id(),
            session_id = %session.id(),
            tutor_id = %cmd.tutor_id,
            registrations = registrations.len(),
            "Request fulfilled"
        );

        Ok(FulfillRequestResult {
            session,
            registrations,
            overridden: conflicts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::FixedClock;
    use crate::adapters::memory::{InMemorySchedulingStore, StoreOperation};
    use crate::application::handlers::request::{SubmitRequestCommand, SubmitRequestHandler};
    use crate::domain::account::{Student, Tutor};
    use crate::domain::foundation::{Level, RequestStatus, StudentId};
    use crate::domain::request::RequestTopic;
    use crate::domain::session::DeliveryMode;
    use chrono::{NaiveDate, NaiveTime};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 11, 1).unwrap()
    }

    fn student(n: u32) -> StudentId {
        StudentId::new(format!("st_{:03}", n)).unwrap()
    }

    fn tutor() -> TutorId {
        TutorId::new("ttr_001").unwrap()
    }

    async fn with_request(
        students: u32,
    ) -> (Arc<InMemorySchedulingStore>, FulfillRequestHandler, RequestId) {
        with_request_on(students, Arc::new(FixedClock::on(today()))).await
    }

    async fn with_request_on(
        students: u32,
        clock: Arc<FixedClock>,
    ) -> (Arc<InMemorySchedulingStore>, FulfillRequestHandler, RequestId) {
        let store = Arc::new(InMemorySchedulingStore::new());
        for n in 1..=students {
            store
                .seed_student(Student {
                    id: student(n),
                    name: format!("Student {n}"),
                    email: format!("s{n}@example.com"),
                })
                .await
                .unwrap();
        }
        store
            .seed_tutor(Tutor {
                id: tutor(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
            })
            .await
            .unwrap();
        let submit = SubmitRequestHandler::new(store.clone(), clock.clone(), SchedulingPolicy::default());
        let mut request_id = None;
        for n in 1..=students {
            let result = submit
                .submit(SubmitRequestCommand {
                    student_id: student(n),
                    topic: RequestTopic {
                        subject: "Math".into(),
                        topic: "Calculus".into(),
                        level: Level::Advanced,
                        details: "Past exam papers".into(),
                    },
                })
                .await
                .unwrap();
            request_id = Some(result.request_id);
        }
        let handler = FulfillRequestHandler::new(store.clone(), clock, SchedulingPolicy::default());
        (store, handler, request_id.unwrap())
    }

    fn command(request_id: &RequestId) -> FulfillRequestCommand {
        FulfillRequestCommand {
            request_id: request_id.clone(),
            tutor_id: tutor(),
            schedule: SessionSchedule {
                date: NaiveDate::from_ymd_opt(2026, 11, 5).unwrap(),
                start_time: NaiveTime::from_hms_opt(16, 0, 0).unwrap(),
                duration_minutes: 90,
                mode: DeliveryMode::online("https://meet.example/calc").unwrap(),
            },
            conflict_override: ConflictOverride::Reject,
        }
    }

    #[tokio::test]
    async fn fulfillment_registers_every_participant() {
        let (store, handler, request_id) = with_request(3).await;
        let result = handler.handle(command(&request_id)).await.unwrap();

        assert_eq!(result.participant_count(), 3);
        assert_eq!(result.session.request_id(), Some(&request_id));
        let request = store.request(&request_id).await.unwrap();
        assert_eq!(request.status(), RequestStatus::Fulfilled);
        assert_eq!(store.registrations_for(result.session.id()).await.len(), 3);
    }

    #[tokio::test]
    async fn session_takes_the_requested_topic() {
        let (_, handler, request_id) = with_request(2).await;
        let result = handler.handle(command(&request_id)).await.unwrap();

        assert_eq!(result.session.subject(), "Math");
        assert_eq!(result.session.topic(), "Calculus");
        assert_eq!(result.session.level(), Level::Advanced);
        assert_eq!(result.session.details(), "Past exam papers");
        assert_eq!(result.registrations.len(), 2);
    }

    #[tokio::test]
    async fn registrations_are_dated_on_request_creation() {
        let clock = Arc::new(FixedClock::on(today()));
        let (store, handler, request_id) = with_request_on(2, clock.clone()).await;
        clock.set_date(NaiveDate::from_ymd_opt(2026, 11, 3).unwrap());

        let result = handler.handle(command(&request_id)).await.unwrap();

        let request = store.request(&request_id).await.unwrap();
        assert_eq!(request.created_on(), today());
        assert!(result
            .registrations
            .iter()
            .all(|r| r.registered_on() == today()));
    }

    #[tokio::test]
    async fn fulfilled_request_cannot_be_fulfilled_again() {
        let (_, handler, request_id) = with_request(1).await;
        handler.handle(command(&request_id)).await.unwrap();
        let mut again = command(&request_id);
        again.schedule.start_time = NaiveTime::from_hms_opt(19, 0, 0).unwrap();
        let err = handler.handle(again).await.unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound { entity: EntityKind::Request, .. }));
    }

    #[tokio::test]
    async fn failed_second_registration_rolls_back_everything() {
        let (store, handler, request_id) = with_request(2).await;
        store.fail_on_nth(StoreOperation::InsertRegistration, 2);

        assert!(handler.handle(command(&request_id)).await.is_err());

        assert_eq!(store.session_count().await, 0);
        assert_eq!(store.registration_count().await, 0);
        let request = store.request(&request_id).await.unwrap();
        assert_eq!(request.status(), RequestStatus::Pending);
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let (_, handler, _) = with_request(1).await;
        let err = handler
            .handle(command(&RequestId::new("req_077").unwrap()))
            .await
            .unwrap_err();
        assert!(matches!(err, SchedulingError::NotFound { entity: EntityKind::Request, .. }));
    }
}
