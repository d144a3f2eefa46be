//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SchedulingStore` / `SchedulingTransaction` - transactional writes
//! - `ScheduleReader` - read-optimized listing queries
//! - `Clock` - current time and date

mod clock;
mod schedule_reader;
mod scheduling_store;

pub use clock::Clock;
pub use schedule_reader::{
    PendingRequestView, RosterEntry, ScheduleReader, ScheduledSessionView, SessionListing,
};
pub use scheduling_store::{SchedulingStore, SchedulingTransaction};
