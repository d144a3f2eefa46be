//! Request domain module.
//!
//! Duplicate topic requests are merged into a single pending
//! `SessionRequest` with a growing participant set.

mod aggregate;
mod participation;

pub use aggregate::{RequestTopic, SessionRequest};
pub use participation::{JoinOutcome, RequestParticipation};
