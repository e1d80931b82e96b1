//! Shared helpers for the presence integration tests.

pub mod helpers;
