//! Daily, weekly and monthly totals computed from stored activities.

mod dashboard_model;
mod dashboard_service;
mod periods;

pub use dashboard_model::*;
pub use dashboard_service::*;
pub use periods::*;
