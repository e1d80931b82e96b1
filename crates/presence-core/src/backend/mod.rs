//! Backend contract and the in-process implementation.
//!
//! All liveness truth lives behind [`Backend`]: TTL-bearing marker storage
//! plus a pub/sub channel. The session never keeps local timers.

mod contract;
mod memory;

pub use contract::{Backend, Subscription, SubscriptionItem};
pub use memory::MemoryBackend;
