mod model;
mod repository;

pub use model::{OwnerDB, OwnerProfileDB};
pub use repository::OwnerRepository;
pub(crate) use repository::ensure_owner;
