mod model;
mod repository;

pub use model::ActivityTypeDB;
pub use repository::ActivityTypeRepository;
