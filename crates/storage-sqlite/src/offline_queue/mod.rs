//! Durable offline request queue.

mod model;
mod repository;

pub use model::OfflineQueueItemDB;
pub use repository::OfflineQueueRepository;
