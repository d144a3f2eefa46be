//! Registration domain module.
//!
//! Registrations are students' seats in concrete sessions; cancelling one
//! leaves an append-only `Cancellation` behind.

mod aggregate;
mod cancellation;

pub use aggregate::Registration;
pub use cancellation::{Cancellation, CancellationReason, MAX_REASON_LENGTH};
