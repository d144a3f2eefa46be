//! Adapters - Implementations of port interfaces.
//!
//! - `clock` - System clock
//! - `http` - REST API over the scheduling engine
//! - `memory` - In-memory store and reader (tests, local runs)
//! - `postgres` - PostgreSQL store and reader

pub mod clock;
pub mod http;
pub mod memory;
pub mod postgres;

pub use clock::{FixedClock, SystemClock};
