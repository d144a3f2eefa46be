//! Registration command and query handlers.

mod cancel_registration;
mod register;
mod student_schedule;

pub use cancel_registration::{
    CancelRegistrationCommand, CancelRegistrationHandler, CancelRegistrationResult,
};
pub use register::{RegisterCommand, RegisterHandler, RegisterResult};
pub use student_schedule::StudentScheduleHandler;
