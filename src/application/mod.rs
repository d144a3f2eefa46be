//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Following CQRS, it separates command handlers (write) from query handlers (read).

mod engine;
pub mod handlers;

pub use engine::SchedulingEngine;
pub use handlers::{
    // Session handlers
    CancelSessionCommand, CancelSessionResult, CreateSessionCommand, CreateSessionResult,
    UpdateSessionCommand, UpdateSessionResult,
    // Request handlers
    FulfillRequestCommand, FulfillRequestResult, JoinRequestCommand, RequestParticipationResult,
    SubmitRequestCommand,
    // Registration handlers
    CancelRegistrationCommand, CancelRegistrationResult, RegisterCommand, RegisterResult,
};
