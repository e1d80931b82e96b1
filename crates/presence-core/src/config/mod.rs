//! Session configuration.

mod session_config;

pub use session_config::{SessionConfig, DEFAULT_TOPIC};
