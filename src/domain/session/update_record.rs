//! Append-only history of session edits.

use serde::{Deserialize, Serialize};

use super::{AuditedField, FieldChange};
use crate::domain::foundation::{SessionId, Timestamp};

/// One audited column change on a session. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub session_id: SessionId,
    pub field: AuditedField,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub updated_at: Timestamp,
}

impl SessionUpdate {
    pub fn record(session_id: SessionId, change: FieldChange, updated_at: Timestamp) -> Self {
        Self {
            session_id,
            field: change.field,
            old_value: change.old_value,
            new_value: change.new_value,
            updated_at,
        }
    }
}
