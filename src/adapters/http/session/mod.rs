//! HTTP adapter for session endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    CreateSessionRequest, RosterEntryResponse, SessionCommandResponse, SessionListingResponse,
    SessionResponse, UpdateSessionRequest,
};
pub use routes::session_routes;
