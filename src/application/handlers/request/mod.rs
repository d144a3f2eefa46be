//! Request command and query handlers.

mod fulfill_request;
mod list_requests;
mod submit_request;

pub use fulfill_request::{FulfillRequestCommand, FulfillRequestHandler, FulfillRequestResult};
pub use list_requests::ListRequestsHandler;
pub use submit_request::{
    JoinRequestCommand, RequestParticipationResult, SubmitRequestCommand, SubmitRequestHandler,
};
