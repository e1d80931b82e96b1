//! Redis implementation of the presence backend contract.

mod redis_backend;

pub use redis_backend::{RedisBackend, MARKER_PREFIX};
