//! Activity types and their MET values.

mod activity_types_model;
mod activity_types_service;
mod activity_types_traits;

pub use activity_types_model::*;
pub use activity_types_service::*;
pub use activity_types_traits::*;
