//! # presence-redis
//!
//! Redis backend adapter for `presence-core`.
//!
//! ## Features
//!
//! - **Connection pool**: managed Redis connection pool with deadpool
//! - **Liveness markers**: pipelined `SET PX` / `EXISTS`, batch `DEL`
//! - **Pub/Sub**: status change publishing plus a dedicated subscriber
//!   connection per session topic
//!
//! ## Example
//!
//! ```ignore
//! use presence_core::{Session, SessionConfig};
//! use presence_redis::{RedisBackend, RedisPoolConfig};
//!
//! let config = RedisPoolConfig::from_url("redis://127.0.0.1:6379");
//! let backend = RedisBackend::connect(&config).await?;
//! let session = Session::new(backend, SessionConfig::default())?;
//!
//! session.online(&["user-1".into()]).await?;
//! ```

pub mod backend;
pub mod pool;

// Re-export adapter types
pub use backend::{RedisBackend, MARKER_PREFIX};
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult};
