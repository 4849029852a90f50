//! Offline-first synchronization for fitlog clients.
//!
//! [`ApiClient`] talks to the backend with a bounded linear-backoff retry and
//! refuses to dial out while the [`NetworkMonitor`] reports offline.
//! [`SyncEngine`] replays the durable queue through it once connectivity
//! returns.
//!
//! [`NetworkMonitor`]: fitlog_core::sync::NetworkMonitor

mod api;
mod client;
mod config;
mod engine;
mod error;
mod types;

pub use client::ApiClient;
pub use config::ClientConfig;
pub use engine::{DrainReport, RequestDispatcher, SendOutcome, SyncEngine, SyncStatus};
pub use error::{Result, SyncError};
pub use types::*;
