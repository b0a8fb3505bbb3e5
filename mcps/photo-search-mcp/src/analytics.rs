//! Opt-in usage events
//!
//! Disabled by default. While disabled nothing is recorded, and switching it
//! off discards everything recorded so far.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::UNTITLED;

/// A single tracked event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsEvent {
    pub name: String,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Default)]
struct TrackerState {
    enabled: bool,
    events: Vec<AnalyticsEvent>,
}

/// In-process event recorder
#[derive(Clone, Default)]
pub struct AnalyticsTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl AnalyticsTracker {
    pub fn new(enabled: bool) -> Self {
        let tracker = Self::default();
        tracker.set_enabled(enabled);
        tracker
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn is_enabled(&self) -> bool {
        self.state().enabled
    }

    pub fn set_enabled(&self, enabled: bool) {
        let mut state = self.state();
        state.enabled = enabled;
        if !enabled {
            state.events.clear();
        }
    }

    pub fn track_search(&self, term: &str) {
        if term.is_empty() {
            return;
        }
        self.track_event("search", json!({ "term": term }));
    }

    pub fn track_photo_click(&self, id: &str, title: &str) {
        if id.is_empty() {
            return;
        }
        let title = if title.is_empty() { UNTITLED } else { title };
        self.track_event("photo_click", json!({ "id": id, "title": title }));
    }

    pub fn track_event(&self, name: &str, data: Value) {
        let mut state = self.state();
        if !state.enabled || name.is_empty() {
            return;
        }

        let event = AnalyticsEvent {
            name: name.to_string(),
            data,
            timestamp: Utc::now(),
        };
        tracing::debug!("Event tracked: {} {}", event.name, event.data);
        state.events.push(event);
    }

    /// Recorded events, oldest first
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.state().events.clone()
    }
}
