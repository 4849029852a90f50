//! SQLite storage for fitlog, built on diesel with an r2d2 pool for reads and
//! a single write actor for every mutation.

pub mod activities;
pub mod activity_types;
pub mod client_identity;
pub mod db;
pub mod errors;
pub mod offline_queue;
pub mod owners;
pub mod schema;
mod utils;

pub use activities::ActivityRepository;
pub use activity_types::ActivityTypeRepository;
pub use client_identity::ClientIdentityRepository;
pub use db::{create_pool, get_connection, init, run_migrations, DbPool, WriteHandle};
pub use errors::StorageError;
pub use offline_queue::OfflineQueueRepository;
pub use owners::OwnerRepository;
