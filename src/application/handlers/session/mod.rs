//! Session command and query handlers.

mod cancel_session;
mod create_session;
mod queries;
mod update_session;

pub use cancel_session::{CancelSessionCommand, CancelSessionHandler, CancelSessionResult};
pub use create_session::{CreateSessionCommand, CreateSessionHandler, CreateSessionResult};
pub use queries::SessionQueryHandler;
pub use update_session::{UpdateSessionCommand, UpdateSessionHandler, UpdateSessionResult};
