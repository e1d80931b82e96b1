//! Error types for the presence session and backend adapters.

mod presence_error;

pub use presence_error::{BackendError, BoxError, PresenceError, PresenceResult};
