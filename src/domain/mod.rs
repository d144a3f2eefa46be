//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, enums, errors)
//! - `scheduling` - Overlap detection, conflict policy and engine errors
//! - `session` - Tutor-owned sessions, typed edits and update history
//! - `request` - Topic requests and their participants
//! - `registration` - Student registrations and cancellations
//! - `account` - Students, tutors and caller identity

pub mod account;
pub mod foundation;
pub mod registration;
pub mod request;
pub mod scheduling;
pub mod session;
