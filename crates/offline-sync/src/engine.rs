//! Offline queue replay.
//!
//! A drain is single-flight: concurrent triggers (the online transition, a
//! manual sync) collapse into whichever drain is already running.

use async_trait::async_trait;
use fitlog_core::sync::{
    should_drop_queued, HttpMethod, NetworkMonitor, NewQueuedRequest,
    OfflineQueueRepositoryTrait, QueuedRequest, SubscriptionId,
};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use crate::client::ApiClient;
use crate::error::{Result, SyncError};

/// Performs one stored request against the backend.
#[async_trait]
pub trait RequestDispatcher: Send + Sync {
    async fn dispatch(&self, method: HttpMethod, url: &str, data: Option<&str>) -> Result<Value>;
}

#[async_trait]
impl RequestDispatcher for ApiClient {
    async fn dispatch(&self, method: HttpMethod, url: &str, data: Option<&str>) -> Result<Value> {
        self.send_raw(method, url, data).await
    }
}

/// Snapshot of sync state for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_online: bool,
    pub is_syncing: bool,
    pub queue_count: i64,
    pub last_sync_error: Option<String>,
}

/// Outcome of one drain pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrainReport {
    pub attempted: usize,
    pub succeeded: usize,
    pub retried: usize,
    pub dropped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    Sent(Value),
    /// Persisted for later replay; carries the queue item id.
    Queued(String),
}

/// Clears the syncing flag however the drain exits.
struct SyncingGuard<'a>(&'a AtomicBool);

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct SyncEngine {
    queue: Arc<dyn OfflineQueueRepositoryTrait>,
    dispatcher: Arc<dyn RequestDispatcher>,
    network: Arc<NetworkMonitor>,
    is_syncing: AtomicBool,
    queue_count: AtomicI64,
    last_sync_error: RwLock<Option<String>>,
    subscription: Mutex<Option<SubscriptionId>>,
}

impl SyncEngine {
    /// Builds an idle engine. Automatic drains on reconnect start only once
    /// the owner calls [`SyncEngine::attach`].
    pub fn new(
        queue: Arc<dyn OfflineQueueRepositoryTrait>,
        dispatcher: Arc<dyn RequestDispatcher>,
        network: Arc<NetworkMonitor>,
    ) -> Arc<Self> {
        let engine = Arc::new(Self {
            queue,
            dispatcher,
            network,
            is_syncing: AtomicBool::new(false),
            queue_count: AtomicI64::new(0),
            last_sync_error: RwLock::new(None),
            subscription: Mutex::new(None),
        });
        if let Err(e) = engine.refresh_queue_count() {
            warn!("[OfflineSync] Could not read initial queue size: {}", e);
        }
        engine
    }

    /// Drains the queue on every offline-to-online transition.
    ///
    /// Must be called from inside a tokio runtime; drains are spawned onto it.
    /// Calling again replaces the previous subscription.
    pub fn attach(self: &Arc<Self>) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|_| SyncError::invalid_request("attach requires a tokio runtime"))?;
        let weak: Weak<Self> = Arc::downgrade(self);

        let id = self.network.subscribe(move |online| {
            if !online {
                return;
            }
            let Some(engine) = weak.upgrade() else {
                return;
            };
            debug!("[OfflineSync] Back online, draining queue");
            handle.spawn(async move {
                if let Err(e) = engine.sync_queue().await {
                    error!("[OfflineSync] Drain aborted: {}", e);
                }
            });
        });

        let previous = self
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(id);
        if let Some(previous) = previous {
            self.network.unsubscribe(previous);
        }
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        self.subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn detach(&self) {
        let current = self
            .subscription
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(id) = current {
            self.network.unsubscribe(id);
        }
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            is_online: self.network.is_online(),
            is_syncing: self.is_syncing.load(Ordering::SeqCst),
            queue_count: self.queue_count.load(Ordering::SeqCst),
            last_sync_error: self.last_sync_error(),
        }
    }

    pub fn last_sync_error(&self) -> Option<String> {
        self.last_sync_error
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn set_last_sync_error(&self, message: Option<String>) {
        *self
            .last_sync_error
            .write()
            .unwrap_or_else(|e| e.into_inner()) = message;
    }

    /// Re-reads the persisted queue size into the status snapshot.
    pub fn refresh_queue_count(&self) -> Result<i64> {
        let count = self.queue.count()?;
        self.queue_count.store(count, Ordering::SeqCst);
        Ok(count)
    }

    pub async fn add_to_queue(
        &self,
        method: HttpMethod,
        url: &str,
        data: Option<String>,
    ) -> Result<String> {
        let id = self
            .queue
            .add(NewQueuedRequest::new(method, url, data))
            .await?;
        let count = self.refresh_queue_count()?;
        debug!(
            "[OfflineSync] Queued {} {} as {} ({} pending)",
            method, url, id, count
        );
        Ok(id)
    }

    pub async fn clear_queue(&self) -> Result<()> {
        self.queue.clear().await?;
        self.refresh_queue_count()?;
        info!("[OfflineSync] Queue cleared");
        Ok(())
    }

    /// Sends the request now when possible, otherwise queues it.
    ///
    /// Reads are never queued: a GET while offline fails with
    /// [`SyncError::Offline`]. A state-changing request is queued when the
    /// device is offline or the direct attempt failed transiently.
    pub async fn send_or_enqueue(
        &self,
        method: HttpMethod,
        url: &str,
        data: Option<String>,
    ) -> Result<SendOutcome> {
        if !self.network.is_online() {
            if !method.is_state_changing() {
                return Err(SyncError::Offline);
            }
            let id = self.add_to_queue(method, url, data).await?;
            return Ok(SendOutcome::Queued(id));
        }

        let result = self.dispatcher.dispatch(method, url, data.as_deref()).await;
        match result {
            Ok(value) => Ok(SendOutcome::Sent(value)),
            Err(err) if method.is_state_changing() && (err.is_offline() || err.is_transient()) => {
                warn!(
                    "[OfflineSync] {} {} failed ({}), queueing for later",
                    method, url, err
                );
                let id = self.add_to_queue(method, url, data).await?;
                Ok(SendOutcome::Queued(id))
            }
            Err(err) => Err(err),
        }
    }

    /// Replays every queued request in FIFO order.
    ///
    /// Returns `Ok(None)` without doing anything when offline or when a drain
    /// is already in progress. A failed request never aborts the pass; the
    /// last one is kept in `last_sync_error`. A failing queue store does abort
    /// it and is returned as the error.
    pub async fn sync_queue(&self) -> Result<Option<DrainReport>> {
        if !self.network.is_online() {
            debug!("[OfflineSync] Skipping drain while offline");
            return Ok(None);
        }
        if self
            .is_syncing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("[OfflineSync] Drain already in progress");
            return Ok(None);
        }
        let _guard = SyncingGuard(&self.is_syncing);
        self.set_last_sync_error(None);

        let mut report = DrainReport::default();
        if let Err(e) = self.drain(&mut report).await {
            error!("[OfflineSync] Queue store failed during drain: {}", e);
            self.set_last_sync_error(Some(e.to_string()));
            // Count may be stale after a store failure.
            let _ = self.refresh_queue_count();
            return Err(e);
        }

        info!(
            "[OfflineSync] Drain finished: attempted={} succeeded={} retried={} dropped={}",
            report.attempted, report.succeeded, report.retried, report.dropped
        );
        Ok(Some(report))
    }

    async fn drain(&self, report: &mut DrainReport) -> Result<()> {
        let items = self.queue.list_sorted()?;
        for item in items {
            report.attempted += 1;
            self.replay(item, report).await?;
        }
        self.refresh_queue_count()?;
        Ok(())
    }

    async fn replay(&self, item: QueuedRequest, report: &mut DrainReport) -> Result<()> {
        let outcome = self
            .dispatcher
            .dispatch(item.method, &item.url, item.data.as_deref())
            .await;

        match outcome {
            Ok(_) => {
                report.succeeded += 1;
                self.queue.remove(item.id).await?;
            }
            Err(err) => {
                let message = format!("{} {}: {}", item.method, item.url, err);
                if should_drop_queued(item.retries) {
                    warn!(
                        "[OfflineSync] Dropping {} after {} failed attempts: {}",
                        item.id,
                        item.retries + 1,
                        message
                    );
                    report.dropped += 1;
                    self.queue.remove(item.id).await?;
                } else {
                    debug!(
                        "[OfflineSync] {} failed (retries={}): {}",
                        item.id, item.retries, message
                    );
                    report.retried += 1;
                    self.queue.increment_retries(item.id).await?;
                }
                self.set_last_sync_error(Some(message));
            }
        }
        Ok(())
    }
}

impl Drop for SyncEngine {
    fn drop(&mut self) {
        self.detach();
    }
}
