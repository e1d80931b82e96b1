//! # presence-core
//!
//! Heartbeat-based presence tracking: an identifier is online only while a
//! caller keeps refreshing it before a TTL expires, and reverts to offline
//! automatically once the refresh stops.
//!
//! ## Features
//!
//! - **Session**: heartbeat (`online`), forced expiry (`offline`),
//!   point-in-time batch queries (`status`), scoped teardown (`close`)
//! - **Change notifications**: a live stream of transitions published by any
//!   session sharing the same backend and topic
//! - **Backend contract**: TTL-bearing marker storage plus pub/sub behind a
//!   narrow trait; the session keeps no local clock or state
//! - **Memory backend**: in-process implementation for tests and
//!   single-process use
//!
//! ## Example
//!
//! ```ignore
//! use presence_core::{MemoryBackend, Session, SessionConfig};
//!
//! let backend = MemoryBackend::new();
//! let session = Session::new(backend, SessionConfig::default())?;
//!
//! // Heartbeat: keep "user-1" alive for one TTL window
//! session.online(&["user-1".into()]).await?;
//!
//! // Query liveness
//! let statuses = session.status(&["user-1".into(), "user-2".into()]).await?;
//!
//! // React to transitions without polling
//! let mut stream = session.listen_status_changes().await?;
//! while let Some(event) = stream.recv().await {
//!     println!("{} is now {}", event.id, event.state);
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod events;
pub mod session;
pub mod telemetry;
pub mod types;

// Re-export commonly used types at crate root
pub use backend::{Backend, MemoryBackend, Subscription, SubscriptionItem};
pub use config::{SessionConfig, DEFAULT_TOPIC};
pub use error::{BackendError, BoxError, PresenceError, PresenceResult};
pub use events::{ChangeEvent, StatusChangeBatch};
pub use session::{Session, StatusStream};
pub use types::{Identifier, ParseStateError, PresenceState, StatusResult};
