//! Photo feed client
//!
//! This module provides a trait-based abstraction for feed transports and the
//! [`PhotoFeedClient`] that wraps one. Two transports exist:
//!
//! - [`direct::DirectTransport`]: plain JSON request/response, for a same-origin
//!   proxy or any endpoint that can answer with bare JSON
//! - [`callback::CallbackTransport`]: callback-wrapped responses (JSONP) with a
//!   single scoped callback registration at a time
//!
//! Both are driven through the same contract: validate, fetch once, normalize.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{FeedConfig, TransportKind};
use crate::error::{FeedError, FeedResult};
use crate::types::PhotoRecord;

pub mod callback;
pub mod direct;
pub mod normalize;

/// Upper bound on a single feed request
pub const FEED_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for feed transports
///
/// A transport issues exactly one outbound request per call and returns the
/// decoded JSON body. Tag validation, timeouts and normalization are the
/// client's job.
#[async_trait]
pub trait FeedTransport: Send + Sync {
    /// Get the name of this transport
    fn name(&self) -> &str;

    /// Fetch the raw feed document for an already trimmed, non-empty tag
    async fn fetch_raw(&self, tag: &str) -> FeedResult<Value>;
}

/// Feed client returning normalized photo records
#[derive(Clone)]
pub struct PhotoFeedClient {
    transport: Arc<dyn FeedTransport>,
    timeout: Duration,
}

impl PhotoFeedClient {
    pub fn new(transport: Arc<dyn FeedTransport>) -> Self {
        Self {
            transport,
            timeout: FEED_TIMEOUT,
        }
    }

    /// Build the client for the transport selected in configuration
    pub fn from_config(config: &FeedConfig) -> FeedResult<Self> {
        let transport: Arc<dyn FeedTransport> = match config.transport {
            TransportKind::Direct => Arc::new(direct::DirectTransport::new(config)?),
            TransportKind::Callback => Arc::new(callback::CallbackTransport::new(config)?),
        };
        Ok(Self::new(transport))
    }

    pub fn transport_name(&self) -> &str {
        self.transport.name()
    }

    /// Fetch and normalize one page of photos for `tag`
    ///
    /// Empty or whitespace-only tags fail with [`FeedError::InvalidQuery`]
    /// before any request is made.
    pub async fn fetch(&self, tag: &str) -> FeedResult<Vec<PhotoRecord>> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(FeedError::InvalidQuery);
        }

        tracing::debug!("Fetching feed for '{}' via {}", tag, self.transport.name());

        let body = tokio::time::timeout(self.timeout, self.transport.fetch_raw(tag))
            .await
            .map_err(|_| FeedError::Timeout)??;

        let records = normalize::normalize_feed(&body);
        tracing::debug!("Feed returned {} records for '{}'", records.len(), tag);
        Ok(records)
    }
}

/// Turn a non-success response into [`FeedError::FetchFailed`]
pub(crate) async fn status_error(response: reqwest::Response) -> FeedError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let snippet: String = text.chars().take(200).collect();

    FeedError::FetchFailed {
        status: Some(status.as_u16()),
        cause: format!("{} {}", status.canonical_reason().unwrap_or("error"), snippet)
            .trim_end()
            .to_string(),
    }
}
