//! Locally persisted owner identity of this client.

mod repository;

pub use repository::{ClientIdentityRepository, OWNER_ID_SETTING_KEY};
