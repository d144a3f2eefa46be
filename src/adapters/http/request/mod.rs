//! HTTP adapter for topic request endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    FulfillTopicRequest, FulfillmentResponse, ParticipationResponse, PendingRequestResponse,
    SubmitTopicRequest,
};
pub use routes::request_routes;
