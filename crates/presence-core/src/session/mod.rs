//! The presence session: heartbeat, query, and change-notification semantics
//! over the backend's raw primitives.

mod listener;
mod presence_session;

pub use listener::StatusStream;
pub use presence_session::Session;
