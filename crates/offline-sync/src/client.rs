//! HTTP client for the fitlog backend.
//!
//! Every request carries the owner id header, is refused outright while the
//! network monitor reports offline, and is retried with linear backoff when
//! the failure is transient.

use fitlog_core::errors::ApiErrorEnvelope;
use fitlog_core::owners::{parse_owner_id, OWNER_ID_HEADER};
use fitlog_core::sync::{linear_backoff, HttpMethod, NetworkMonitor};
use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::ClientConfig;
use crate::error::{Result, SyncError};

const MAX_LOG_BODY_CHARS: usize = 512;

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Patch => reqwest::Method::PATCH,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}

/// Client for the fitlog REST API.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_base_delay: Duration,
    owner_id: RwLock<Option<String>>,
    network: Arc<NetworkMonitor>,
}

impl ApiClient {
    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("API response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("API response error ({}): {}", status, preview);
    }

    pub fn new(config: &ClientConfig, network: Arc<NetworkMonitor>) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
            retry_base_delay: config.retry_base_delay,
            owner_id: RwLock::new(None),
            network,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn network(&self) -> &Arc<NetworkMonitor> {
        &self.network
    }

    /// Sets the owner id sent with every request. Must be a UUID.
    pub fn set_owner_id(&self, owner_id: &str) -> Result<()> {
        let owner_id = parse_owner_id(Some(owner_id))?;
        *self.owner_id.write().unwrap_or_else(|e| e.into_inner()) = Some(owner_id);
        Ok(())
    }

    pub fn clear_owner_id(&self) {
        *self.owner_id.write().unwrap_or_else(|e| e.into_inner()) = None;
    }

    pub fn owner_id(&self) -> Option<String> {
        self.owner_id
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Create headers for an API request.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(owner_id) = self.owner_id() {
            let value = HeaderValue::from_str(&owner_id)
                .map_err(|_| SyncError::invalid_request("Invalid owner id format"))?;
            headers.insert(OWNER_ID_HEADER, value);
        }

        Ok(headers)
    }

    /// Absolute URLs pass through, paths are joined onto the base URL.
    fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Parse a response body. Any 2xx is a success: an empty body becomes
    /// `null` and a body that is not JSON is kept as a string.
    async fn parse_response(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);

        if !status.is_success() {
            if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(&body) {
                return Err(SyncError::api(
                    status.as_u16(),
                    envelope.error.code,
                    envelope.error.message,
                ));
            }
            return Err(SyncError::api(
                status.as_u16(),
                None,
                format!("Request failed: {}", body),
            ));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                debug!("API response ({}) is not JSON: {}", status, e);
                Ok(Value::String(body))
            }
        }
    }

    async fn send_once(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self
            .client
            .request(to_reqwest_method(method), url)
            .headers(self.headers()?);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::parse_response(response).await
    }

    /// Sends one logical request, retrying transient failures up to
    /// `max_retries` extra times. Connectivity is re-checked before every
    /// attempt so going offline mid-retry stops immediately.
    async fn exchange(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self.url(path);
        let mut retries: u32 = 0;

        loop {
            if !self.network.is_online() {
                debug!("[OfflineSync] Refusing {} {} while offline", method, path);
                return Err(SyncError::Offline);
            }

            match self.send_once(method, &url, body).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && retries < self.max_retries => {
                    retries += 1;
                    let delay = linear_backoff(retries, self.retry_base_delay);
                    warn!(
                        "[OfflineSync] {} {} failed ({}), retry {}/{} in {:?}",
                        method, path, err, retries, self.max_retries, delay
                    );
                    sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Like `exchange`, decoding the payload into `T`.
    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let value = self.exchange(method, path, body).await?;
        serde_json::from_value(value).map_err(|e| {
            error!("Failed to deserialize response of {} {}: {}", method, path, e);
            SyncError::from(e)
        })
    }

    /// GET {path}
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(HttpMethod::Get, path, None).await
    }

    /// POST {path}
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(HttpMethod::Post, path, Some(&body)).await
    }

    /// PUT {path}
    pub async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(HttpMethod::Put, path, Some(&body)).await
    }

    /// PATCH {path}
    pub async fn patch<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let body = serde_json::to_value(body)?;
        self.request(HttpMethod::Patch, path, Some(&body)).await
    }

    /// DELETE {path}
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(HttpMethod::Delete, path, None).await
    }

    /// Replays a request in its stored form: method, URL and the serialized
    /// JSON body, if any. DELETE never carries a body. Any 2xx counts as
    /// delivered, whatever the response payload.
    pub async fn send_raw(
        &self,
        method: HttpMethod,
        url: &str,
        data: Option<&str>,
    ) -> Result<Value> {
        let body = match data {
            _ if method == HttpMethod::Delete => None,
            Some(raw) if !raw.trim().is_empty() => Some(serde_json::from_str::<Value>(raw)?),
            _ => None,
        };
        self.exchange(method, url, body.as_ref()).await
    }
}
