//! Logged activities: models, soft validation, service and repository contract.

mod activities_model;
mod activities_service;
mod activities_traits;
mod activities_validation;

pub use activities_model::*;
pub use activities_service::*;
pub use activities_traits::*;
pub use activities_validation::*;
