//! Registration entity: a student's seat in a session.

use chrono::NaiveDate;

use crate::domain::foundation::{
    DomainError, ErrorCode, RegistrationId, RegistrationStatus, SessionId, StateMachine, StudentId,
};

/// Student x session edge.
///
/// At most one `registered` registration exists per (student, session);
/// cancelled ones are kept as history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    id: RegistrationId,
    student_id: StudentId,
    session_id: SessionId,
    registered_on: NaiveDate,
    status: RegistrationStatus,
}

impl Registration {
    pub fn new(
        id: RegistrationId,
        student_id: StudentId,
        session_id: SessionId,
        registered_on: NaiveDate,
    ) -> Self {
        Self {
            id,
            student_id,
            session_id,
            registered_on,
            status: RegistrationStatus::Registered,
        }
    }

    /// Reconstitute a registration from persistence.
    pub fn reconstitute(
        id: RegistrationId,
        student_id: StudentId,
        session_id: SessionId,
        registered_on: NaiveDate,
        status: RegistrationStatus,
    ) -> Self {
        Self {
            id,
            student_id,
            session_id,
            registered_on,
            status,
        }
    }

    pub fn id(&self) -> &RegistrationId {
        &self.id
    }

    pub fn student_id(&self) -> &StudentId {
        &self.student_id
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn registered_on(&self) -> NaiveDate {
        self.registered_on
    }

    pub fn status(&self) -> RegistrationStatus {
        self.status
    }

    /// Cancels the registration on behalf of `student_id`.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the registration belongs to someone else
    /// - `InvalidStateTransition` if already cancelled
    pub fn cancel(&mut self, student_id: &StudentId) -> Result<(), DomainError> {
        if &self.student_id != student_id {
            return Err(DomainError::new(
                ErrorCode::Forbidden,
                "Only the registered student can cancel a registration",
            ));
        }
        self.status = self.status.transition_to(RegistrationStatus::Cancelled)?;
        Ok(())
    }
}
