//! Domain layer for fitlog: models, validation, services and the repository
//! contracts implemented by the storage crate.

pub mod activities;
pub mod activity_types;
pub mod calories;
pub mod dashboard;
pub mod errors;
pub mod owners;
pub mod sync;

#[cfg(test)]
pub(crate) mod test_support;

pub use errors::{Error, Result};
