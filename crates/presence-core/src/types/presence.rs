//! Identifier and presence state types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a trackable entity (user, device, connection).
///
/// Two sessions sharing a backend observe the same liveness for the same
/// identifier; no uniqueness is enforced beyond the backend's key space.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Create an identifier from any string-like value
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identifier, returning the inner string
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Presence state of an identifier.
///
/// Derived, never stored independently: an identifier is `Online` exactly
/// while a TTL-bearing liveness marker for it exists in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceState {
    /// A liveness marker exists and its TTL has not elapsed
    Online,
    /// No liveness marker: never seen, expired, or explicitly taken offline
    Offline,
}

impl Default for PresenceState {
    fn default() -> Self {
        Self::Offline
    }
}

impl PresenceState {
    /// Check whether this state is `Online`
    #[must_use]
    pub fn is_online(&self) -> bool {
        matches!(self, Self::Online)
    }
}

impl fmt::Display for PresenceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Error when parsing a `PresenceState` from string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid presence state: {0}")]
pub struct ParseStateError(pub String);

impl std::str::FromStr for PresenceState {
    type Err = ParseStateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            other => Err(ParseStateError(other.to_string())),
        }
    }
}

/// Result of a `status` query for one identifier.
///
/// Produced in input order, one result per queried id, duplicates preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResult {
    /// The queried identifier
    pub id: Identifier,
    /// Its state at the time of the query
    pub state: PresenceState,
}

impl StatusResult {
    /// Pair an identifier with its observed state
    #[must_use]
    pub fn new(id: Identifier, state: PresenceState) -> Self {
        Self { id, state }
    }
}
