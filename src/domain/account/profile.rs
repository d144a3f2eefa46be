//! Student and tutor accounts as the engine sees them.
//!
//! Accounts are created by the external account component; the engine
//! only reads them, so there is no validation here beyond what storage
//! round-trips need.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StudentId, TutorId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tutor {
    pub id: TutorId,
    pub name: String,
    pub email: String,
}
