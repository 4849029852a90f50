//! Calorie estimation from MET values and owner weight.

mod calories_service;

pub use calories_service::*;
