//! Remote Store Module
//!
//! Passthrough to an HTTP key/value service.
//!
//! # Protocol
//! - `PUT /set` with `{"key", "value", "ttl"}` (ttl in seconds)
//! - `GET /get/:key` returns `{"key", "value"}`, or 404 when absent
//! - `DELETE /del/:key` returns 200, or 404 when absent
//!
//! Expiry is the service's job; an expired key simply comes back as 404.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use tracing::debug;

use crate::config::RemoteStoreConfig;
use crate::context::Context;
use crate::error::{CacheError, Result};
use crate::models::{ErrorResponse, GetResponse, SetRequest};
use crate::store::Store;

// == Remote Store ==
/// Store backed by a remote key/value service.
#[derive(Debug, Clone)]
pub struct RemoteStore {
    client: Client,
    base_url: Url,
}

impl RemoteStore {
    // == Constructor ==
    /// Builds a store with its own HTTP client.
    pub fn new(config: &RemoteStoreConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| CacheError::Configuration(format!("failed to build http client: {}", e)))?;
        Self::with_client(client, &config.base_url)
    }

    /// Builds a store around an existing client, e.g. one shared with the
    /// rest of the application.
    pub fn with_client(client: Client, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CacheError::Configuration(format!("invalid base url {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CacheError::Configuration(format!(
                "base url {} cannot carry a path",
                base_url
            )));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CacheError::Configuration(format!("base url {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Turns a non-success response into a backend error.
async fn unexpected(response: Response) -> CacheError {
    let status = response.status();
    let detail = response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_default();
    if detail.is_empty() {
        CacheError::Backend(format!("unexpected status {}", status))
    } else {
        CacheError::Backend(format!("unexpected status {}: {}", status, detail))
    }
}

#[async_trait]
impl Store for RemoteStore {
    async fn get(&self, ctx: &Context, key: &str) -> Result<String> {
        let url = self.endpoint(&["get", key])?;
        debug!(%url, "remote get");

        ctx.run(async {
            let response = self.client.get(url).send().await?;
            match response.status() {
                StatusCode::OK => Ok(response.json::<GetResponse>().await?.value),
                StatusCode::NOT_FOUND => Err(CacheError::NoData(key.to_string())),
                _ => Err(unexpected(response).await),
            }
        })
        .await
    }

    async fn set(&self, ctx: &Context, key: &str, value: String, ttl: Duration) -> Result<()> {
        let url = self.endpoint(&["set"])?;
        debug!(%url, key, "remote set");

        ctx.run(async {
            let body = SetRequest::new(key, &value, ttl);
            let response = self.client.put(url).json(&body).send().await?;
            if response.status().is_success() {
                Ok(())
            } else {
                Err(unexpected(response).await)
            }
        })
        .await
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        let url = self.endpoint(&["del", key])?;
        debug!(%url, "remote delete");

        ctx.run(async {
            let response = self.client.delete(url).send().await?;
            match response.status() {
                status if status.is_success() => Ok(()),
                StatusCode::NOT_FOUND => Ok(()),
                _ => Err(unexpected(response).await),
            }
        })
        .await
    }
}
