//! Failure injection for the in-memory store.

use std::collections::HashMap;

use crate::domain::foundation::DomainError;

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Begin,
    MaxSequence,
    FindStudent,
    FindTutor,
    InsertStudent,
    InsertTutor,
    FindSession,
    SessionsInScope,
    InsertSession,
    UpdateSession,
    InsertSessionUpdate,
    FindRequest,
    FindPendingRequest,
    InsertRequest,
    UpdateRequest,
    InsertParticipation,
    Participants,
    FindActiveRegistration,
    InsertRegistration,
    UpdateRegistration,
    InsertCancellation,
    Commit,
}

/// Pending one-shot failures, keyed by operation.
///
/// Each entry counts down the calls of its operation and fails the one
/// that brings it to zero, then disarms.
#[derive(Debug, Default)]
pub(crate) struct FaultPlan {
    armed: HashMap<StoreOperation, u32>,
}

impl FaultPlan {
    pub(crate) fn arm(&mut self, operation: StoreOperation, nth_call: u32) {
        self.armed.insert(operation, nth_call.max(1));
    }

    pub(crate) fn clear(&mut self) {
        self.armed.clear();
    }

    /// Counts a call to `operation`, failing it if its turn has come.
    pub(crate) fn check(&mut self, operation: StoreOperation) -> Result<(), DomainError> {
        let Some(remaining) = self.armed.get_mut(&operation) else {
            return Ok(());
        };
        *remaining -= 1;
        if *remaining == 0 {
            self.armed.remove(&operation);
            return Err(DomainError::database(
                &format!("{:?}", operation),
                "injected failure",
            ));
        }
        Ok(())
    }
}
