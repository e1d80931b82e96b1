//! Core presence types.
//!
//! Identifiers, the online/offline state enum, and status query results.

mod presence;

pub use presence::{Identifier, ParseStateError, PresenceState, StatusResult};
