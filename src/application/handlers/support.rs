//! Steps shared by the command handlers.

use crate::domain::foundation::{
    DomainError, EntityKind, ErrorCode, IdentifierGenerator, SessionId, TutorId,
};
use crate::domain::scheduling::{
    find_conflicts, ConflictScope, ConflictingSession, SchedulingError, TimeSlot,
};
use crate::ports::{SchedulingStore, SchedulingTransaction};

/// Allocates the next identifier of `kind` inside `tx`.
pub(crate) async fn next_id(
    tx: &mut dyn SchedulingTransaction,
    ids: IdentifierGenerator,
    kind: EntityKind,
) -> Result<String, SchedulingError> {
    let current = tx.max_sequence(kind).await?;
    ids.next(kind, current).map_err(|err| {
        tracing::error!(kind = %kind, width = ids.width(), "Identifier space exhausted");
        SchedulingError::from(err)
    })
}

/// Every active session in `scope` that overlaps `slot`.
pub(crate) async fn scope_conflicts(
    tx: &mut dyn SchedulingTransaction,
    scope: &ConflictScope,
    slot: &TimeSlot,
    exclude: Option<&SessionId>,
) -> Result<Vec<ConflictingSession>, SchedulingError> {
    let existing = tx.sessions_in_scope(scope, slot.date()).await?;
    Ok(find_conflicts(slot, &existing, exclude))
}

/// Conflict error for a session that lost the (tutor, date, start) slot.
///
/// Must be called after the failed transaction has been dropped.
pub(crate) async fn slot_taken(
    store: &dyn SchedulingStore,
    tutor_id: &TutorId,
    slot: &TimeSlot,
    exclude: Option<&SessionId>,
) -> SchedulingError {
    tracing::warn!(
        tutor_id = %tutor_id,
        date = %slot.date(),
        start = %slot.start(),
        "Slot already taken at write time"
    );
    let scope = ConflictScope::Tutor(tutor_id.clone());
    let conflicts = async {
        let mut tx = store.begin().await?;
        scope_conflicts(tx.as_mut(), &scope, slot, exclude).await
    }
    .await;
    match conflicts {
        Ok(conflicts) => SchedulingError::Conflict { conflicts },
        Err(err) => err,
    }
}

/// True if a store error is the tutor-slot uniqueness backstop.
pub(crate) fn is_slot_taken(err: &DomainError) -> bool {
    err.code == ErrorCode::SlotTaken
}
