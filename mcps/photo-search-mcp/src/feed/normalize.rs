//! Normalization of raw feed items into [`PhotoRecord`]s
//!
//! Every function here is pure. Malformed fields degrade to the sentinels
//! below instead of failing the batch.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::types::PhotoRecord;

/// Author name used when the raw author field is missing or unrecognized
pub const UNKNOWN_AUTHOR: &str = "unknown author";

/// Feed author fields look like `nobody@flickr.com ("Display Name")`
static AUTHOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\("(.+?)"\)"#).unwrap());

/// Extract the display name from a raw author field
pub fn extract_author_name(raw: Option<&str>) -> String {
    raw.and_then(|s| AUTHOR_RE.captures(s))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

/// Parse the date formats the feed emits, keeping the offset they carry
///
/// Accepts RFC 3339 (the usual case), a naive `YYYY-MM-DDTHH:MM:SS` or
/// `YYYY-MM-DD HH:MM:SS` (taken as UTC), or a bare date.
pub fn parse_feed_date_local(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Parse a feed date as an instant, for ordering
pub fn parse_feed_date(raw: &str) -> Option<DateTime<Utc>> {
    parse_feed_date_local(raw).map(|dt| dt.with_timezone(&Utc))
}

/// Render a date for display in its own offset, e.g. `3 May 2024`
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Split the space-separated tag string, keeping order and duplicates
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(str::to_string).collect()
}

/// Derive a record id from its link
///
/// Photo pages end in the numeric photo id (`.../photos/user/12345/`), so the
/// last non-empty path segment is used. Links that don't parse fall back to
/// the link itself, and missing links to `item-<index>`.
pub fn derive_id(link: &str, index: usize) -> String {
    let link = link.trim();
    if link.is_empty() {
        return format!("item-{index}");
    }

    url::Url::parse(link)
        .ok()
        .and_then(|url| {
            url.path_segments()?
                .filter(|s| !s.is_empty())
                .next_back()
                .map(str::to_string)
        })
        .unwrap_or_else(|| link.to_string())
}

fn str_field<'a>(item: &'a Value, key: &str) -> Option<&'a str> {
    item.get(key).and_then(Value::as_str)
}

/// Normalize a single feed item; non-object items yield `None`
pub fn normalize_item(item: &Value, index: usize) -> Option<PhotoRecord> {
    if !item.is_object() {
        return None;
    }

    let title = str_field(item, "title").unwrap_or_default().to_string();
    let author_raw = str_field(item, "author").unwrap_or_default().to_string();
    let link = str_field(item, "link").unwrap_or_default().to_string();
    let thumbnail_url = item
        .get("media")
        .and_then(|m| m.get("m"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let tags = str_field(item, "tags").map(split_tags).unwrap_or_default();

    let taken_raw = str_field(item, "date_taken").filter(|s| !s.trim().is_empty());
    let published_raw = str_field(item, "published").filter(|s| !s.trim().is_empty());
    let taken_local = taken_raw.and_then(parse_feed_date_local);
    let published_local = published_raw.and_then(parse_feed_date_local);
    let taken_at = taken_local.map(|dt| dt.with_timezone(&Utc));
    let published_at = published_local.map(|dt| dt.with_timezone(&Utc));
    let sort_date = taken_at.or(published_at);

    // the calendar day where the photo was taken, not the UTC one
    let formatted_date = match taken_local.or(published_local) {
        Some(date) => Some(format_date(&date)),
        None => taken_raw.or(published_raw).map(str::to_string),
    };

    let description = str_field(item, "description")
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);

    Some(PhotoRecord {
        id: derive_id(&link, index),
        author_name: extract_author_name(Some(&author_raw)),
        title,
        author_raw,
        link,
        thumbnail_url,
        tags,
        published_at,
        taken_at,
        sort_date,
        formatted_date,
        description,
    })
}

/// Normalize a whole feed response
///
/// A missing or non-array `items` container is an empty result, not an error.
pub fn normalize_feed(body: &Value) -> Vec<PhotoRecord> {
    let Some(items) = body.get("items").and_then(Value::as_array) else {
        tracing::debug!("Feed response has no items array, treating as empty");
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let record = normalize_item(item, index);
            if record.is_none() {
                tracing::warn!("Skipping malformed feed item at index {}", index);
            }
            record
        })
        .collect()
}
