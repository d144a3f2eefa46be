//! Account module - students, tutors and caller identity.

mod caller;
mod profile;

pub use caller::{Caller, CallerError};
pub use profile::{Student, Tutor};
