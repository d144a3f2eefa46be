//! In-memory scheduling store for tests and local development.
//!
//! # Security Note
//!
//! This adapter is for **testing only** and should not be used in production.
//! It uses `.expect()` on the fault-plan lock which will panic if poisoned.
//! Production code should use `PostgresSchedulingStore`.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::faults::{FaultPlan, StoreOperation};
use crate::domain::account::{Student, Tutor};
use crate::domain::foundation::{
    DomainError, EntityKind, ErrorCode, Level, RegistrationId, RequestId, SessionId, StudentId,
    TutorId,
};
use crate::domain::registration::{Cancellation, Registration};
use crate::domain::request::{RequestParticipation, SessionRequest};
use crate::domain::scheduling::ConflictScope;
use crate::domain::session::{Session, SessionUpdate};
use crate::ports::{SchedulingStore, SchedulingTransaction};

/// Everything the store holds.
#[derive(Debug, Clone, Default)]
pub(crate) struct StoreState {
    pub(crate) students: BTreeMap<StudentId, Student>,
    pub(crate) tutors: BTreeMap<TutorId, Tutor>,
    pub(crate) sessions: BTreeMap<SessionId, Session>,
    pub(crate) session_updates: Vec<SessionUpdate>,
    pub(crate) requests: BTreeMap<RequestId, SessionRequest>,
    pub(crate) participations: Vec<RequestParticipation>,
    pub(crate) registrations: BTreeMap<RegistrationId, Registration>,
    pub(crate) cancellations: Vec<Cancellation>,
}

impl StoreState {
    fn slot_holder(&self, session: &Session) -> Option<&Session> {
        if !session.status().is_active() {
            return None;
        }
        self.sessions.values().find(|other| {
            other.id() != session.id()
                && other.status().is_active()
                && other.tutor_id() == session.tutor_id()
                && other.date() == session.date()
                && other.start_time() == session.start_time()
        })
    }

    fn check_slot(&self, session: &Session) -> Result<(), DomainError> {
        match self.slot_holder(session) {
            Some(holder) => Err(DomainError::new(
                ErrorCode::SlotTaken,
                format!(
                    "Tutor {} already has session {} at {} {}",
                    session.tutor_id(),
                    holder.id(),
                    session.date(),
                    session.start_time()
                ),
            )
            .with_detail("tutor_id", session.tutor_id().to_string())
            .with_detail("session_id", holder.id().to_string())),
            None => Ok(()),
        }
    }

    pub(crate) fn active_registration(
        &self,
        student_id: &StudentId,
        session_id: &SessionId,
    ) -> Option<&Registration> {
        self.registrations.values().find(|r| {
            r.status().is_active() && r.student_id() == student_id && r.session_id() == session_id
        })
    }
}

/// In-memory implementation of `SchedulingStore` and `ScheduleReader`.
///
/// Transactions are serialized: `begin` takes an owned lock on the state
/// and works on a copy, which `commit` swaps in. Dropping a transaction
/// discards the copy.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(InMemorySchedulingStore::new());
/// store.seed_tutor(tutor).await?;
///
/// // Make the second registration insert fail.
/// store.fail_on_nth(StoreOperation::InsertRegistration, 2);
/// ```
#[derive(Clone, Default)]
pub struct InMemorySchedulingStore {
    pub(crate) state: Arc<Mutex<StoreState>>,
    faults: Arc<StdMutex<FaultPlan>>,
}

impl InMemorySchedulingStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    /// Fails the next call of `operation`.
    ///
    /// # Panics
    ///
    /// Panics if the fault-plan lock is poisoned.
    pub fn fail_on(&self, operation: StoreOperation) {
        self.fail_on_nth(operation, 1);
    }

    /// Fails the `nth` call (1-based) of `operation` from now on.
    ///
    /// # Panics
    ///
    /// Panics if the fault-plan lock is poisoned.
    pub fn fail_on_nth(&self, operation: StoreOperation, nth: u32) {
        self.faults
            .lock()
            .expect("InMemorySchedulingStore: fault lock poisoned")
            .arm(operation, nth);
    }

    /// Disarms every pending fault.
    ///
    /// # Panics
    ///
    /// Panics if the fault-plan lock is poisoned.
    pub fn clear_faults(&self) {
        self.faults
            .lock()
            .expect("InMemorySchedulingStore: fault lock poisoned")
            .clear();
    }

    /// Inserts a student account in its own transaction.
    pub async fn seed_student(&self, student: Student) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;
        tx.insert_student(&student).await?;
        tx.commit().await
    }

    /// Inserts a tutor account in its own transaction.
    pub async fn seed_tutor(&self, tutor: Tutor) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;
        tx.insert_tutor(&tutor).await?;
        tx.commit().await
    }

    /// Number of sessions in any status.
    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    /// Number of registrations in any status.
    pub async fn registration_count(&self) -> usize {
        self.state.lock().await.registrations.len()
    }

    /// Number of audit rows across all sessions.
    pub async fn session_update_count(&self) -> usize {
        self.state.lock().await.session_updates.len()
    }

    /// Number of participations of a request.
    pub async fn participation_count(&self, request_id: &RequestId) -> usize {
        self.state
            .lock()
            .await
            .participations
            .iter()
            .filter(|p| &p.request_id == request_id)
            .count()
    }

    /// A request by id, in any status.
    pub async fn request(&self, request_id: &RequestId) -> Option<SessionRequest> {
        self.state.lock().await.requests.get(request_id).cloned()
    }

    /// Every registration of a session, cancelled ones included.
    pub async fn registrations_for(&self, session_id: &SessionId) -> Vec<Registration> {
        self.state
            .lock()
            .await
            .registrations
            .values()
            .filter(|r| r.session_id() == session_id)
            .cloned()
            .collect()
    }

    fn check(&self, operation: StoreOperation) -> Result<(), DomainError> {
        self.faults
            .lock()
            .expect("InMemorySchedulingStore: fault lock poisoned")
            .check(operation)
    }
}

#[async_trait]
impl SchedulingStore for InMemorySchedulingStore {
    async fn begin(&self) -> Result<Box<dyn SchedulingTransaction>, DomainError> {
        self.check(StoreOperation::Begin)?;
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryTransaction {
            guard,
            working,
            store: self.clone(),
        }))
    }
}

/// A serialized unit of work over a private copy of the state.
pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<StoreState>,
    working: StoreState,
    store: InMemorySchedulingStore,
}

impl InMemoryTransaction {
    fn check(&self, operation: StoreOperation) -> Result<(), DomainError> {
        self.store.check(operation)
    }
}

#[async_trait]
impl SchedulingTransaction for InMemoryTransaction {
    async fn max_sequence(&mut self, kind: EntityKind) -> Result<Option<u64>, DomainError> {
        self.check(StoreOperation::MaxSequence)?;
        let s = &self.working;
        let max = match kind {
            EntityKind::Student => s.students.keys().map(StudentId::sequence).max(),
            EntityKind::Tutor => s.tutors.keys().map(TutorId::sequence).max(),
            EntityKind::Request => s.requests.keys().map(RequestId::sequence).max(),
            EntityKind::Session => s.sessions.keys().map(SessionId::sequence).max(),
            EntityKind::Registration => s.registrations.keys().map(RegistrationId::sequence).max(),
        };
        Ok(max)
    }

    async fn find_student(&mut self, id: &StudentId) -> Result<Option<Student>, DomainError> {
        self.check(StoreOperation::FindStudent)?;
        Ok(self.working.students.get(id).cloned())
    }

    async fn find_tutor(&mut self, id: &TutorId) -> Result<Option<Tutor>, DomainError> {
        self.check(StoreOperation::FindTutor)?;
        Ok(self.working.tutors.get(id).cloned())
    }

    async fn insert_student(&mut self, student: &Student) -> Result<(), DomainError> {
        self.check(StoreOperation::InsertStudent)?;
        let email = student.email.to_lowercase();
        if self
            .working
            .students
            .values()
            .any(|s| s.email.to_lowercase() == email)
        {
            return Err(DomainError::new(
                ErrorCode::DuplicateEmail,
                "A student with this email already exists",
            ));
        }
        self.working.students.insert(student.id.clone(), student.clone());
        Ok(())
    }

    async fn insert_tutor(&mut self, tutor: &Tutor) -> Result<(), DomainError> {
        self.check(StoreOperation::InsertTutor)?;
        let email = tutor.email.to_lowercase();
        if self
            .working
            .tutors
            .values()
            .any(|t| t.email.to_lowercase() == email)
        {
            return Err(DomainError::new(
                ErrorCode::DuplicateEmail,
                "A tutor with this email already exists",
            ));
        }
        self.working.tutors.insert(tutor.id.clone(), tutor.clone());
        Ok(())
    }

    async fn find_session(&mut self, id: &SessionId) -> Result<Option<Session>, DomainError> {
        self.check(StoreOperation::FindSession)?;
        Ok(self.working.sessions.get(id).cloned())
    }

    async fn sessions_in_scope(
        &mut self,
        scope: &ConflictScope,
        date: NaiveDate,
    ) -> Result<Vec<Session>, DomainError> {
        self.check(StoreOperation::SessionsInScope)?;
        let s = &self.working;
        let on_date = |session: &&Session| session.status().is_active() && session.date() == date;
        let sessions = match scope {
            ConflictScope::Tutor(tutor_id) => s
                .sessions
                .values()
                .filter(on_date)
                .filter(|session| session.tutor_id() == tutor_id)
                .cloned()
                .collect(),
            ConflictScope::Student(student_id) => s
                .sessions
                .values()
                .filter(on_date)
                .filter(|session| s.active_registration(student_id, session.id()).is_some())
                .cloned()
                .collect(),
        };
        Ok(sessions)
    }

    async fn insert_session(&mut self, session: &Session) -> Result<(), DomainError> {
        self.check(StoreOperation::InsertSession)?;
        if self.working.sessions.contains_key(session.id()) {
            return Err(DomainError::database(
                "insert session",
                format!("duplicate key {}", session.id()),
            ));
        }
        self.working.check_slot(session)?;
        self.working.sessions.insert(session.id().clone(), session.clone());
        Ok(())
    }

    async fn update_session(&mut self, session: &Session) -> Result<(), DomainError> {
        self.check(StoreOperation::UpdateSession)?;
        if !self.working.sessions.contains_key(session.id()) {
            return Err(DomainError::new(ErrorCode::SessionNotFound, "Session not found")
                .with_detail("id", session.id().to_string()));
        }
        self.working.check_slot(session)?;
        self.working.sessions.insert(session.id().clone(), session.clone());
        Ok(())
    }

    async fn insert_session_update(&mut self, update: &SessionUpdate) -> Result<(), DomainError> {
        self.check(StoreOperation::InsertSessionUpdate)?;
        self.working.session_updates.push(update.clone());
        Ok(())
    }

    async fn find_request(&mut self, id: &RequestId) -> Result<Option<SessionRequest>, DomainError> {
        self.check(StoreOperation::FindRequest)?;
        Ok(self.working.requests.get(id).cloned())
    }

    async fn find_pending_request(
        &mut self,
        subject: &str,
        topic: &str,
        level: Level,
    ) -> Result<Option<SessionRequest>, DomainError> {
        self.check(StoreOperation::FindPendingRequest)?;
        Ok(self
            .working
            .requests
            .values()
            .find(|r| r.status().is_pending() && r.matches(subject, topic, level))
            .cloned())
    }

    async fn insert_request(&mut self, request: &SessionRequest) -> Result<(), DomainError> {
        self.check(StoreOperation::InsertRequest)?;
        let duplicate = self.working.requests.values().any(|r| {
            r.status().is_pending() && r.matches(request.subject(), request.topic(), request.level())
        });
        if duplicate {
            return Err(DomainError::new(
                ErrorCode::DuplicateRequest,
                "A matching pending request already exists",
            ));
        }
        self.working.requests.insert(request.id().clone(), request.clone());
        Ok(())
    }

    async fn update_request(&mut self, request: &SessionRequest) -> Result<(), DomainError> {
        self.check(StoreOperation::UpdateRequest)?;
        match self.working.requests.get_mut(request.id()) {
            Some(stored) => {
                *stored = request.clone();
                Ok(())
            }
            None => Err(DomainError::new(ErrorCode::RequestNotFound, "Request not found")
                .with_detail("id", request.id().to_string())),
        }
    }

    async fn insert_participation(
        &mut self,
        participation: &RequestParticipation,
    ) -> Result<bool, DomainError> {
        self.check(StoreOperation::InsertParticipation)?;
        let exists = self.working.participations.iter().any(|p| {
            p.request_id == participation.request_id && p.student_id == participation.student_id
        });
        if exists {
            return Ok(false);
        }
        self.working.participations.push(participation.clone());
        Ok(true)
    }

    async fn participants(
        &mut self,
        request_id: &RequestId,
    ) -> Result<Vec<RequestParticipation>, DomainError> {
        self.check(StoreOperation::Participants)?;
        Ok(self
            .working
            .participations
            .iter()
            .filter(|p| &p.request_id == request_id)
            .cloned()
            .collect())
    }

    async fn find_active_registration(
        &mut self,
        student_id: &StudentId,
        session_id: &SessionId,
    ) -> Result<Option<Registration>, DomainError> {
        self.check(StoreOperation::FindActiveRegistration)?;
        Ok(self.working.active_registration(student_id, session_id).cloned())
    }

    async fn insert_registration(&mut self, registration: &Registration) -> Result<(), DomainError> {
        self.check(StoreOperation::InsertRegistration)?;
        if self
            .working
            .active_registration(registration.student_id(), registration.session_id())
            .is_some()
        {
            return Err(DomainError::new(
                ErrorCode::DuplicateRegistration,
                "Student is already registered for this session",
            )
            .with_detail("student_id", registration.student_id().to_string())
            .with_detail("session_id", registration.session_id().to_string()));
        }
        self.working
            .registrations
            .insert(registration.id().clone(), registration.clone());
        Ok(())
    }

    async fn update_registration(&mut self, registration: &Registration) -> Result<(), DomainError> {
        self.check(StoreOperation::UpdateRegistration)?;
        match self.working.registrations.get_mut(registration.id()) {
            Some(stored) => {
                *stored = registration.clone();
                Ok(())
            }
            None => Err(DomainError::new(
                ErrorCode::RegistrationNotFound,
                "Registration not found",
            )
            .with_detail("id", registration.id().to_string())),
        }
    }

    async fn insert_cancellation(&mut self, cancellation: &Cancellation) -> Result<(), DomainError> {
        self.check(StoreOperation::InsertCancellation)?;
        self.working.cancellations.push(cancellation.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), DomainError> {
        self.check(StoreOperation::Commit)?;
        let InMemoryTransaction {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tutor(n: u32) -> Tutor {
        Tutor {
            id: TutorId::new(format!("ttr_{:03}", n)).unwrap(),
            name: format!("Tutor {}", n),
            email: format!("tutor{}@example.com", n),
        }
    }

    #[tokio::test]
    async fn committed_writes_are_visible() {
        let store = InMemorySchedulingStore::new();
        store.seed_tutor(tutor(1)).await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_tutor(&tutor(1).id).await.unwrap().is_some());
        assert_eq!(tx.max_sequence(EntityKind::Tutor).await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let store = InMemorySchedulingStore::new();
        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_tutor(&tutor(1)).await.unwrap();
        }
        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_tutor(&tutor(1).id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_reported() {
        let store = InMemorySchedulingStore::new();
        store.seed_tutor(tutor(1)).await.unwrap();
        let mut clash = tutor(2);
        clash.email = "TUTOR1@example.com".into();
        let err = store.seed_tutor(clash).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateEmail);
    }

    #[tokio::test]
    async fn injected_commit_failure_discards_writes() {
        let store = InMemorySchedulingStore::new();
        store.fail_on(StoreOperation::Commit);
        assert!(store.seed_tutor(tutor(1)).await.is_err());

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.max_sequence(EntityKind::Tutor).await.unwrap(), None);
    }
}
