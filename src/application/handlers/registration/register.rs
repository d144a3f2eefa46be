//! RegisterHandler - Command handler for booking a seat in a session.

use std::sync::Arc;

use crate::application::handlers::support::{next_id, scope_conflicts};
use crate::domain::foundation::{EntityKind, ErrorCode, RegistrationId, SessionId, StudentId};
use crate::domain::registration::Registration;
use crate::domain::scheduling::{
    ConflictOverride, ConflictScope, ConflictingSession, SchedulingError, SchedulingPolicy,
};
use crate::ports::{Clock, SchedulingStore};

/// Command to register a student for a session.
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub student_id: StudentId,
    pub session_id: SessionId,
    pub conflict_override: ConflictOverride,
}

/// Result of a registration.
#[derive(Debug, Clone)]
pub struct RegisterResult {
    pub registration: Registration,
    /// Sessions on the student's schedule the new one overlaps.
    pub overridden: Vec<ConflictingSession>,
}

/// Handler for registrations.
pub struct RegisterHandler {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
    policy: SchedulingPolicy,
}

impl RegisterHandler {
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

    pub async fn handle(&self, cmd: RegisterCommand) -> Result<RegisterResult, SchedulingError> {
        let today = self.clock.today();

        let mut tx = self.store.begin().await?;
        if tx.find_student(&cmd.student_id).await?.is_none() {
            return Err(SchedulingError::not_found(EntityKind::Student, &cmd.student_id));
        }
        let session = tx
            .find_session(&cmd.session_id)
            .await?
            .filter(|s| s.is_bookable(today))
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Session, &cmd.session_id))?;

        let already_registered = SchedulingError::AlreadyRegistered {
            student_id: cmd.student_id.clone(),
            session_id: cmd.session_id.clone(),
        };
        if tx
            .find_active_registration(&cmd.student_id, &cmd.session_id)
            .await?
            .is_some()
        {
            return Err(already_registered);
        }

        let scope = ConflictScope::Student(cmd.student_id.clone());
        let conflicts = scope_conflicts(tx.as_mut(), &scope, &session.slot(), None).await?;
        if let Err(err) = self
            .policy
            .resolve(&scope, conflicts.clone(), cmd.conflict_override)
        {
            tracing::warn!(
                student_id = %cmd.student_id,
                session_id = %cmd.session_id,
                conflicts = conflicts.len(),
                "Registration rejected: schedule conflict"
            );
            return Err(err);
        }

        let id = next_id(tx.as_mut(), self.policy.identifiers(), EntityKind::Registration).await?;
        let registration = Registration::new(
            RegistrationId::new(id)?,
            cmd.student_id.clone(),
            cmd.session_id.clone(),
            today,
        );
        match tx.insert_registration(&registration).await {
            Err(err) if err.code == ErrorCode::DuplicateRegistration => {
                return Err(already_registered)
            }
            other => other?,
        }
        tx.commit().await?;

        tracing::info!(
            registration_id = %registration.id(),
            student_id = %cmd.student_id,
            session_id = %cmd.session_id,
            overridden = conflicts.len(),
            "Student registered"
        );

        Ok(RegisterResult {
            registration,
            overridden: conflicts,
        })
    }
}
