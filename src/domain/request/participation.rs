//! Students' declared interest in a pending request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RequestId, StudentId};

/// (request, student) pair, unique per pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestParticipation {
    pub request_id: RequestId,
    pub student_id: StudentId,
    pub joined_on: NaiveDate,
}

/// What happened when a student submitted or joined a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinOutcome {
    /// A new pending request was opened.
    Created,
    /// The student joined an existing pending request.
    Joined,
    /// The student was already a participant; nothing changed.
    AlreadyParticipating,
}
