//! Callback-wrapped (JSONP) transport
//!
//! For endpoints that only answer cross-origin requests as
//! `callbackName({...})`. Each request registers a uniquely named callback
//! and the body is only accepted when it is wrapped in that name.
//!
//! At most one registration is pending at a time. Acquiring a new one
//! cancels the previous request, and a [`CallbackToken`] releases its
//! registration when dropped, so success, error, timeout and cancellation
//! paths all leave the registry empty.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::oneshot;

use super::{status_error, FeedTransport};
use crate::config::FeedConfig;
use crate::error::{FeedError, FeedResult};

const CALLBACK_PREFIX: &str = "photoFeedCallback";

struct Registration {
    name: String,
    cancel: oneshot::Sender<()>,
}

/// Holds the single pending callback registration
#[derive(Default)]
pub struct CallbackRegistry {
    pending: Mutex<Option<Registration>>,
    seq: AtomicU64,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> MutexGuard<'_, Option<Registration>> {
        self.pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a fresh callback, cancelling any pending one
    pub fn acquire(&self) -> CallbackToken<'_> {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst);
        let name = format!(
            "{}_{}_{}",
            CALLBACK_PREFIX,
            chrono::Utc::now().timestamp_millis(),
            seq
        );
        let (cancel, cancelled) = oneshot::channel();

        let previous = self.slot().replace(Registration {
            name: name.clone(),
            cancel,
        });
        if let Some(previous) = previous {
            tracing::debug!("Cancelling pending callback {}", previous.name);
            let _ = previous.cancel.send(());
        }

        CallbackToken {
            registry: self,
            name,
            cancelled,
        }
    }

    /// Name of the pending registration, if any
    pub fn pending(&self) -> Option<String> {
        self.slot().as_ref().map(|r| r.name.clone())
    }

    fn release(&self, name: &str) {
        let mut slot = self.slot();
        if slot.as_ref().is_some_and(|r| r.name == name) {
            slot.take();
        }
    }
}

/// Scoped ownership of one callback registration
pub struct CallbackToken<'a> {
    registry: &'a CallbackRegistry,
    name: String,
    cancelled: oneshot::Receiver<()>,
}

impl CallbackToken<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolves once a newer registration has replaced this one
    async fn superseded(&mut self) {
        let _ = (&mut self.cancelled).await;
    }
}

impl Drop for CallbackToken<'_> {
    fn drop(&mut self) {
        self.registry.release(&self.name);
    }
}

/// Strip the `name(...)` wrapper from a callback response body
pub fn unwrap_callback<'a>(body: &'a str, name: &str) -> FeedResult<&'a str> {
    let body = body.trim();
    let body = body.strip_suffix(';').unwrap_or(body).trim_end();

    body.strip_prefix(name)
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(|| FeedError::transport(format!("response is not wrapped in callback {name}")))
}

/// JSONP-style transport
pub struct CallbackTransport {
    client: Client,
    base_url: String,
    registry: CallbackRegistry,
}

impl CallbackTransport {
    pub fn new(config: &FeedConfig) -> FeedResult<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| FeedError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            registry: CallbackRegistry::new(),
        })
    }

    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    async fn request(&self, tag: &str, callback: &str) -> FeedResult<Value> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("format", "json"), ("tags", tag), ("jsoncallback", callback)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let text = response.text().await?;
        let payload = unwrap_callback(&text, callback)?;
        serde_json::from_str(payload)
            .map_err(|e| FeedError::transport(format!("invalid callback payload: {e}")))
    }
}

#[async_trait]
impl FeedTransport for CallbackTransport {
    fn name(&self) -> &str {
        "callback"
    }

    async fn fetch_raw(&self, tag: &str) -> FeedResult<Value> {
        let mut token = self.registry.acquire();
        let callback = token.name().to_string();
        tracing::debug!("Registered callback {}", callback);

        tokio::select! {
            result = self.request(tag, &callback) => result,
            _ = token.superseded() => {
                tracing::debug!("Callback {} superseded", callback);
                Err(FeedError::transport("superseded by a newer feed request"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unwrap_callback() {
        assert_eq!(unwrap_callback("cb({\"a\":1})", "cb").unwrap(), "{\"a\":1}");
        assert_eq!(unwrap_callback("  cb ( {} );\n", "cb").unwrap(), " {} ");
        assert!(unwrap_callback("other({})", "cb").is_err());
        assert!(unwrap_callback("{\"a\":1}", "cb").is_err());
    }

    #[test]
    fn test_token_releases_on_drop() {
        let registry = CallbackRegistry::new();
        {
            let token = registry.acquire();
            assert_eq!(registry.pending().as_deref(), Some(token.name()));
        }
        assert!(registry.pending().is_none());
    }

    #[test]
    fn test_names_are_unique() {
        let registry = CallbackRegistry::new();
        let first = registry.acquire().name().to_string();
        let second = registry.acquire().name().to_string();
        assert_ne!(first, second);
        assert!(first.starts_with(CALLBACK_PREFIX));
    }

    #[tokio::test]
    async fn test_new_registration_cancels_previous() {
        let registry = CallbackRegistry::new();
        let mut first = registry.acquire();
        let second = registry.acquire();

        // resolves immediately because `second` replaced it
        first.superseded().await;
        assert_eq!(registry.pending().as_deref(), Some(second.name()));

        // dropping the stale token must not release the newer registration
        drop(first);
        assert_eq!(registry.pending().as_deref(), Some(second.name()));

        drop(second);
        assert!(registry.pending().is_none());
    }
}
