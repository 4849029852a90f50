mod model;
mod repository;

pub use model::{ActivityChangesDB, ActivityDB};
pub use repository::ActivityRepository;
