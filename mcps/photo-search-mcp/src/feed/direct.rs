//! Direct JSON transport
//!
//! Requests the feed with `nojsoncallback=1` so the body is bare JSON. Used
//! against the public endpoint or a same-origin proxy in front of it.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::{status_error, FeedTransport};
use crate::config::FeedConfig;
use crate::error::{FeedError, FeedResult};

/// Plain request/response transport
pub struct DirectTransport {
    client: Client,
    base_url: String,
}

impl DirectTransport {
    pub fn new(config: &FeedConfig) -> FeedResult<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| FeedError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl FeedTransport for DirectTransport {
    fn name(&self) -> &str {
        "direct"
    }

    async fn fetch_raw(&self, tag: &str) -> FeedResult<Value> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("format", "json"), ("tags", tag), ("nojsoncallback", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let body: Value = response.json().await?;
        Ok(body)
    }
}
