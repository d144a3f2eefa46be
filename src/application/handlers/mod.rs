//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod registration;
pub mod request;
pub mod session;
pub(crate) mod support;

pub use registration::{
    CancelRegistrationCommand, CancelRegistrationHandler, CancelRegistrationResult,
    RegisterCommand, RegisterHandler, RegisterResult, StudentScheduleHandler,
};
pub use request::{
    FulfillRequestCommand, FulfillRequestHandler, FulfillRequestResult, JoinRequestCommand,
    ListRequestsHandler, RequestParticipationResult, SubmitRequestCommand, SubmitRequestHandler,
};
pub use session::{
    CancelSessionCommand, CancelSessionHandler, CancelSessionResult, CreateSessionCommand,
    CreateSessionHandler, CreateSessionResult, SessionQueryHandler, UpdateSessionCommand,
    UpdateSessionHandler, UpdateSessionResult,
};
