//! Session domain module.
//!
//! Sessions are tutor-owned, fixed-duration meetings. Edits are expressed
//! as typed `SessionChange` diffs and every resulting column change is
//! recorded as a `SessionUpdate`.

mod aggregate;
mod changes;
mod mode;
mod update_record;

pub use aggregate::{Session, SessionDetails, SessionSchedule};
pub use changes::{format_date, format_time, AuditedField, FieldChange, SessionChange};
pub use mode::DeliveryMode;
pub use update_record::SessionUpdate;
