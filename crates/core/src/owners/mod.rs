//! Owners and their profiles.

mod owners_model;
mod owners_service;
mod owners_traits;

pub use owners_model::*;
pub use owners_service::*;
pub use owners_traits::*;
