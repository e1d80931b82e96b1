//! Status change events published on the shared presence topic.
//!
//! The encoding is an internal contract between session instances sharing a
//! backend: what `online`/`offline` publish is exactly what the listener
//! decodes.

use crate::types::{Identifier, PresenceState};
use serde::{Deserialize, Serialize};

/// A single observed state transition, delivered on the notification stream.
///
/// Represents a transition that has already happened in the backend, not a
/// prediction. Stream order is the only sequencing token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// The identifier that transitioned
    pub id: Identifier,
    /// The state it transitioned to
    pub state: PresenceState,
}

impl ChangeEvent {
    /// Create a change event
    #[must_use]
    pub fn new(id: Identifier, state: PresenceState) -> Self {
        Self { id, state }
    }
}

/// Wire payload for one publish on the presence topic.
///
/// A single `online`/`offline` call covering several identifiers is published
/// as one batch; listeners re-expand it into per-identifier [`ChangeEvent`]s.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusChangeBatch {
    /// One entry per identifier in the originating call
    pub changes: Vec<ChangeEvent>,
    /// Publisher-side timestamp, milliseconds since the Unix epoch
    pub at: i64,
}

impl StatusChangeBatch {
    /// Build a batch marking every given identifier with the same state
    #[must_use]
    pub fn new(ids: &[Identifier], state: PresenceState) -> Self {
        Self {
            changes: ids
                .iter()
                .map(|id| ChangeEvent::new(id.clone(), state))
                .collect(),
            at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Serialize to the wire format
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from the wire format
    pub fn decode(payload: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(payload)
    }
}
