//! HTTP adapter for registration endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CancelRegistrationRequest, CancelRegistrationResponse, RegisterRequest, RegisterResponse,
    RegistrationResponse, ScheduleEntryResponse,
};
pub use routes::registration_routes;
