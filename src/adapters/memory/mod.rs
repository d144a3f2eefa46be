//! In-memory adapters for tests and local development.

mod faults;
mod reader;
mod store;

pub use faults::StoreOperation;
pub use store::{InMemorySchedulingStore, InMemoryTransaction};
