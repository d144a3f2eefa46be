//! CancelRegistrationHandler - Command handler for giving up a seat.

use std::sync::Arc;

use crate::domain::foundation::{EntityKind, SessionId, StudentId};
use crate::domain::registration::{Cancellation, CancellationReason, Registration};
use crate::domain::scheduling::SchedulingError;
use crate::ports::{Clock, SchedulingStore};

/// Command to cancel a student's registration.
#[derive(Debug, Clone)]
pub struct CancelRegistrationCommand {
    pub student_id: StudentId,
    pub session_id: SessionId,
    pub reason: String,
}

/// Result of a registration cancellation.
#[derive(Debug, Clone)]
pub struct CancelRegistrationResult {
    pub registration: Registration,
    pub cancellation: Cancellation,
}

/// Handler for cancelling registrations.
pub struct CancelRegistrationHandler {
    store: Arc<dyn SchedulingStore>,
    clock: Arc<dyn Clock>,
}

impl CancelRegistrationHandler {
    pub fn new(store: Arc<dyn SchedulingStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn handle(
        &self,
        cmd: CancelRegistrationCommand,
    ) -> Result<CancelRegistrationResult, SchedulingError> {
        let reason = CancellationReason::new(cmd.reason)?;

        let mut tx = self.store.begin().await?;
        let mut registration = tx
            .find_active_registration(&cmd.student_id, &cmd.session_id)
            .await?
            .ok_or_else(|| {
                SchedulingError::not_found(
                    EntityKind::Registration,
                    format!("{} for {}", cmd.student_id, cmd.session_id),
                )
            })?;
        registration.cancel(&cmd.student_id)?;

        let cancellation = Cancellation {
            session_id: cmd.session_id.clone(),
            student_id: cmd.student_id.clone(),
            reason,
            cancelled_at: self.clock.now(),
        };
        tx.update_registration(&registration).await?;
        tx.insert_cancellation(&cancellation).await?;
        tx.commit().await?;

        tracing::info!(
            registration_id = %registration.id(),
            student_id = %cmd.student_id,
            session_id = %cmd.session_id,
            "Registration cancelled"
        );

        Ok(CancelRegistrationResult {
            registration,
            cancellation,
        })
    }
}
