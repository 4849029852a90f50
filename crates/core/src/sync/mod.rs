//! Offline write queue, connectivity state and retry policy.

mod connectivity;
mod offline_queue_model;
mod retry_policy;

pub use connectivity::*;
pub use offline_queue_model::*;
pub use retry_policy::*;
