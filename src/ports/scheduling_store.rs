//! Transactional scheduling store port (write side).
//!
//! Every state-changing engine operation runs inside exactly one
//! `SchedulingTransaction`. Dropping a transaction without calling
//! `commit` discards everything it wrote.
//!
//! # Design
//!
//! - **Uniqueness backstops**: implementations enforce the storage-level
//!   constraints and report violations with a dedicated `ErrorCode`
//!   (`SlotTaken`, `DuplicateRegistration`, `DuplicateRequest`,
//!   `DuplicateEmail`) rather than a generic `DatabaseError`
//! - **Allocation in the consuming transaction**: `max_sequence` is read in
//!   the same transaction that inserts the new identifier

use crate::domain::account::{Student, Tutor};
use crate::domain::foundation::{
    DomainError, EntityKind, Level, RequestId, SessionId, StudentId, TutorId,
};
use crate::domain::registration::{Cancellation, Registration};
use crate::domain::request::{RequestParticipation, SessionRequest};
use crate::domain::scheduling::ConflictScope;
use crate::domain::session::{Session, SessionUpdate};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Opens scheduling transactions.
#[async_trait]
pub trait SchedulingStore: Send + Sync {
    /// Begin a new transaction.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` if no transaction could be started
    async fn begin(&self) -> Result<Box<dyn SchedulingTransaction>, DomainError>;
}

/// One unit of work against the scheduling store.
#[async_trait]
pub trait SchedulingTransaction: Send {
    /// Highest sequence number currently used by `kind`, if any.
    async fn max_sequence(&mut self, kind: EntityKind) -> Result<Option<u64>, DomainError>;

    async fn find_student(&mut self, id: &StudentId) -> Result<Option<Student>, DomainError>;

    async fn find_tutor(&mut self, id: &TutorId) -> Result<Option<Tutor>, DomainError>;

    /// # Errors
    ///
    /// - `DuplicateEmail` if another student uses the same email
    async fn insert_student(&mut self, student: &Student) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `DuplicateEmail` if another tutor uses the same email
    async fn insert_tutor(&mut self, tutor: &Tutor) -> Result<(), DomainError>;

    /// Find a session, locking it for the rest of the transaction.
    async fn find_session(&mut self, id: &SessionId) -> Result<Option<Session>, DomainError>;

    /// Active sessions on `date` that belong to the scope: the tutor's own
    /// sessions, or the sessions the student is actively registered for.
    async fn sessions_in_scope(
        &mut self,
        scope: &ConflictScope,
        date: NaiveDate,
    ) -> Result<Vec<Session>, DomainError>;

    /// # Errors
    ///
    /// - `SlotTaken` if the tutor already has an active session starting at
    ///   the same date and time
    async fn insert_session(&mut self, session: &Session) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `SessionNotFound` if the session does not exist
    /// - `SlotTaken` as for `insert_session`
    async fn update_session(&mut self, session: &Session) -> Result<(), DomainError>;

    async fn insert_session_update(&mut self, update: &SessionUpdate) -> Result<(), DomainError>;

    async fn find_request(&mut self, id: &RequestId) -> Result<Option<SessionRequest>, DomainError>;

    /// The pending request matching (subject, topic) case-insensitively and
    /// `level` exactly, locked for the rest of the transaction.
    async fn find_pending_request(
        &mut self,
        subject: &str,
        topic: &str,
        level: Level,
    ) -> Result<Option<SessionRequest>, DomainError>;

    /// # Errors
    ///
    /// - `DuplicateRequest` if a matching pending request already exists
    async fn insert_request(&mut self, request: &SessionRequest) -> Result<(), DomainError>;

    /// # Errors
    ///
    /// - `RequestNotFound` if the request does not exist
    async fn update_request(&mut self, request: &SessionRequest) -> Result<(), DomainError>;

    /// Adds a participant. Returns `false` if the pair already existed,
    /// leaving the transaction usable.
    async fn insert_participation(
        &mut self,
        participation: &RequestParticipation,
    ) -> Result<bool, DomainError>;

    /// Participants of a request in joining order.
    async fn participants(
        &mut self,
        request_id: &RequestId,
    ) -> Result<Vec<RequestParticipation>, DomainError>;

    async fn find_active_registration(
        &mut self,
        student_id: &StudentId,
        session_id: &SessionId,
    ) -> Result<Option<Registration>, DomainError>;

    /// # Errors
    ///
    /// - `DuplicateRegistration` if the student already holds an active
    ///   registration for the session
    async fn insert_registration(&mut self, registration: &Registration) -> Result<(), DomainError>;

    async fn update_registration(&mut self, registration: &Registration) -> Result<(), DomainError>;

    async fn insert_cancellation(&mut self, cancellation: &Cancellation) -> Result<(), DomainError>;

    /// Make every write of this transaction durable.
    async fn commit(self: Box<Self>) -> Result<(), DomainError>;
}
