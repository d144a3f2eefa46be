//! HTTP middleware for axum.
//!
//! This module contains extractors for cross-cutting concerns:
//!
//! - `caller` - Caller identity extractors

pub mod caller;

pub use caller::{AnyCaller, CallerRejection, RequireStudent, RequireTutor, CALLER_HEADER};
