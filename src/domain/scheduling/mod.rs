//! Scheduling rules shared by every engine operation.
//!
//! - `interval` - half-open overlap predicate and dated time slots
//! - `conflict` - tutor- and student-scoped conflict scans
//! - `policy` - override and duration rules
//! - `errors` - the engine's error taxonomy

mod conflict;
mod errors;
mod fields;
mod interval;
mod policy;

pub use conflict::{find_conflicts, ConflictOverride, ConflictScope, ConflictingSession};
pub use errors::SchedulingError;
pub use fields::{validate_details, validate_label, MAX_DETAILS_LENGTH, MAX_LABEL_LENGTH};
pub use interval::{overlaps, TimeSlot};
pub use policy::{SchedulingPolicy, DEFAULT_MAX_DURATION_MINUTES};
