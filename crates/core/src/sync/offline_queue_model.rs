use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Everything except GET. Only these are worth queueing while offline.
    pub fn is_state_changing(&self) -> bool {
        !matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(Error::invalid_input(
                "method",
                format!("Unsupported HTTP method '{}'", other),
            )),
        }
    }
}

/// A request persisted while offline, replayed later by the sync engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedRequest {
    pub id: String,
    pub method: HttpMethod,
    pub url: String,
    /// Serialized JSON body, parsed only when replayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    /// Epoch milliseconds at enqueue time.
    pub timestamp: i64,
    pub retries: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewQueuedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub data: Option<String>,
}

impl NewQueuedRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>, data: Option<String>) -> Self {
        Self {
            method,
            url: url.into(),
            data,
        }
    }

    pub fn with_json<T: Serialize>(
        method: HttpMethod,
        url: impl Into<String>,
        body: &T,
    ) -> Result<Self> {
        Ok(Self::new(method, url, Some(serde_json::to_string(body)?)))
    }
}

/// Drain order: ascending timestamp, id as tiebreak.
pub fn sort_for_drain(items: &mut [QueuedRequest]) {
    items.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));
}

/// Durable FIFO of requests waiting for connectivity.
///
/// Every mutation is committed before it returns.
#[async_trait]
pub trait OfflineQueueRepositoryTrait: Send + Sync {
    /// Persists the request with a fresh id, the current time and zero retries.
    async fn add(&self, request: NewQueuedRequest) -> Result<String>;
    /// Every queued item in drain order.
    fn list_sorted(&self) -> Result<Vec<QueuedRequest>>;
    fn get(&self, id: &str) -> Result<Option<QueuedRequest>>;
    /// No-op for unknown ids.
    async fn remove(&self, id: String) -> Result<()>;
    /// No-op for unknown ids.
    async fn increment_retries(&self, id: String) -> Result<()>;
    fn count(&self) -> Result<i64>;
    async fn clear(&self) -> Result<()>;
}
