//! Status change events and their wire encoding.

mod status_change;

pub use status_change::{ChangeEvent, StatusChangeBatch};
