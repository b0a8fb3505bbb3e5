//! Common types for photo search results and result views
//!
//! These types are shared by the feed client, the projector and the
//! session controller, and are what the MCP tools serialize back out.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Placeholder shown for records without a title
pub const UNTITLED: &str = "Untitled";

/// Default number of records per page
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// A single normalized photo from the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Stable identifier derived from the link
    pub id: String,
    /// Title as published (may be empty)
    pub title: String,
    /// Author field exactly as the feed formats it
    pub author_raw: String,
    /// Display name extracted from `author_raw`
    pub author_name: String,
    /// Canonical photo page URI
    pub link: String,
    /// Thumbnail image URI
    pub thumbnail_url: String,
    /// Tags in feed order (duplicates kept)
    pub tags: Vec<String>,
    /// When the photo was published to the feed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// When the photo was taken
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<DateTime<Utc>>,
    /// `taken_at`, falling back to `published_at`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_date: Option<DateTime<Utc>>,
    /// Human readable date (or the raw string when it could not be parsed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_date: Option<String>,
    /// HTML description from the feed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PhotoRecord {
    /// Title for display, with a placeholder for untitled photos
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED
        } else {
            &self.title
        }
    }

    /// Title and tags joined and lowercased, used by content filters
    pub fn searchable_text(&self) -> String {
        let mut text = self.title.to_lowercase();
        for tag in &self.tags {
            text.push(' ');
            text.push_str(&tag.to_lowercase());
        }
        text
    }
}

/// How the result list is ordered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Feed order
    #[default]
    Relevance,
    /// Newest first
    DateDesc,
    /// Oldest first
    DateAsc,
    /// Longest title first. The feed carries no real interestingness
    /// signal, so this is an approximation.
    Interestingness,
}

/// Which records are kept before sorting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ContentFilter {
    #[default]
    All,
    /// Everything that does not look like a screen capture
    PhotosOnly,
    /// Only screen captures
    Screenshots,
}

/// Parameters that shape the projected view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewParameters {
    pub sort_mode: SortMode,
    pub content_filter: ContentFilter,
    /// 1-based page number
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewParameters {
    fn default() -> Self {
        Self {
            sort_mode: SortMode::default(),
            content_filter: ContentFilter::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ViewParameters {
    /// Defaults with a specific page size
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            ..Self::default()
        }
    }

    /// Merge a partial update; zero page or page size values are ignored
    pub fn merge(&mut self, patch: &ViewPatch) {
        if let Some(sort_mode) = patch.sort_mode {
            self.sort_mode = sort_mode;
        }
        if let Some(content_filter) = patch.content_filter {
            self.content_filter = content_filter;
        }
        if let Some(page) = patch.page.filter(|p| *p > 0) {
            self.page = page;
        }
        if let Some(page_size) = patch.page_size.filter(|s| *s > 0) {
            self.page_size = page_size;
        }
    }
}

/// Partial update for [`ViewParameters`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_mode: Option<SortMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_filter: Option<ContentFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
}

/// One slot in the pagination controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageMarker {
    Page(usize),
    Gap,
}

/// The filtered, sorted and paged slice of results
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectedView {
    /// Records on the current page
    pub items: Vec<PhotoRecord>,
    /// Number of records after filtering
    pub total_count: usize,
    pub total_pages: usize,
    /// Page actually shown (after clamping)
    pub current_page: usize,
    pub has_previous: bool,
    pub has_next: bool,
    /// Pagination controls; empty when everything fits on one page
    pub pages: Vec<PageMarker>,
}

/// Lifecycle of a search session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, tags: &[&str]) -> PhotoRecord {
        PhotoRecord {
            id: "1".to_string(),
            title: title.to_string(),
            author_raw: String::new(),
            author_name: String::new(),
            link: String::new(),
            thumbnail_url: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            published_at: None,
            taken_at: None,
            sort_date: None,
            formatted_date: None,
            description: None,
        }
    }

    #[test]
    fn test_display_title_placeholder() {
        assert_eq!(record("", &[]).display_title(), UNTITLED);
        assert_eq!(record("   ", &[]).display_title(), UNTITLED);
        assert_eq!(record("Sunset", &[]).display_title(), "Sunset");
    }

    #[test]
    fn test_searchable_text_lowercases_title_and_tags() {
        let text = record("My Desk", &["ScreenShot", "work"]).searchable_text();
        assert_eq!(text, "my desk screenshot work");
    }

    #[test]
    fn test_merge_ignores_zero_values() {
        let mut view = ViewParameters::default();
        view.merge(&ViewPatch {
            sort_mode: Some(SortMode::DateAsc),
            page: Some(0),
            page_size: Some(0),
            ..ViewPatch::default()
        });
        assert_eq!(view.sort_mode, SortMode::DateAsc);
        assert_eq!(view.page, 1);
        assert_eq!(view.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_sort_mode_wire_names() {
        let json = serde_json::to_string(&SortMode::DateDesc).unwrap();
        assert_eq!(json, "\"date-desc\"");
        let filter: ContentFilter = serde_json::from_str("\"photos-only\"").unwrap();
        assert_eq!(filter, ContentFilter::PhotosOnly);
    }
}
