//! Layered error types.
//!
//! Backend adapters surface [`BackendError`]; the session maps those into
//! [`PresenceError`] for its public API.

/// Boxed source error carried by backend failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by backend adapters.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The store is unreachable (at construction or mid-operation)
    #[error("backend unreachable: {0}")]
    Connection(#[source] BoxError),

    /// An individual refresh/exists/delete/publish failed
    #[error("backend operation failed: {0}")]
    Operation(#[source] BoxError),

    /// A pub/sub subscription could not be established or broke
    #[error("backend subscription failed: {0}")]
    Subscription(#[source] BoxError),
}

impl BackendError {
    /// Wrap any error as a connection failure
    pub fn connection(err: impl Into<BoxError>) -> Self {
        Self::Connection(err.into())
    }

    /// Wrap any error as an operation failure
    pub fn operation(err: impl Into<BoxError>) -> Self {
        Self::Operation(err.into())
    }

    /// Wrap any error as a subscription failure
    pub fn subscription(err: impl Into<BoxError>) -> Self {
        Self::Subscription(err.into())
    }
}

/// Errors returned by the presence session API.
#[derive(Debug, thiserror::Error)]
pub enum PresenceError {
    /// The backend was unreachable when the call was made
    #[error("connection error: {0}")]
    Connection(#[source] BoxError),

    /// A backend primitive failed; no identifier changed state
    #[error("operation error: {0}")]
    Operation(#[source] BoxError),

    /// The notification stream's underlying subscription broke
    #[error("subscription error: {0}")]
    Subscription(#[source] BoxError),

    /// The session was closed; no backend I/O was attempted
    #[error("session is closed")]
    SessionClosed,

    /// Rejected session configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A status change payload could not be encoded
    #[error("status change payload error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<BackendError> for PresenceError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Connection(source) => Self::Connection(source),
            BackendError::Operation(source) => Self::Operation(source),
            BackendError::Subscription(source) => Self::Subscription(source),
        }
    }
}

/// Result type alias for session operations
pub type PresenceResult<T> = Result<T, PresenceError>;
