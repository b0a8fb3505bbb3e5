//! Result projection - filter, sort and page a result set
//!
//! Filtering runs first so page counts reflect the filtered set. Sorting is
//! stable. Requests for a page past the end clamp to the last page.

use std::cmp::Ordering;

use crate::types::{ContentFilter, PageMarker, PhotoRecord, ProjectedView, SortMode, ViewParameters};

/// Markers that identify screen captures in title or tags
const SCREENSHOT_MARKERS: [&str; 2] = ["screenshot", "capture"];

/// Most numbered pages shown in the pagination controls
const MAX_PAGE_LINKS: usize = 5;

fn is_screenshot(record: &PhotoRecord) -> bool {
    let text = record.searchable_text();
    SCREENSHOT_MARKERS.iter().any(|marker| text.contains(marker))
}

fn keep(record: &PhotoRecord, filter: ContentFilter) -> bool {
    match filter {
        ContentFilter::All => true,
        ContentFilter::PhotosOnly => !is_screenshot(record),
        ContentFilter::Screenshots => is_screenshot(record),
    }
}

/// Sort in place; `sort_by` is stable so ties keep feed order
fn sort_records(records: &mut [&PhotoRecord], mode: SortMode) {
    match mode {
        SortMode::Relevance => {}
        SortMode::DateDesc => records.sort_by(|a, b| match (a.sort_date, b.sort_date) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        SortMode::DateAsc => records.sort_by(|a, b| match (a.sort_date, b.sort_date) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }),
        SortMode::Interestingness => {
            records.sort_by(|a, b| b.title.chars().count().cmp(&a.title.chars().count()))
        }
    }
}

/// Project `results` through `view` into the slice to render
pub fn project(results: &[PhotoRecord], view: &ViewParameters) -> ProjectedView {
    let page_size = view.page_size.max(1);

    let mut kept: Vec<&PhotoRecord> = results
        .iter()
        .filter(|r| keep(r, view.content_filter))
        .collect();
    sort_records(&mut kept, view.sort_mode);

    let total_count = kept.len();
    let total_pages = total_count.div_ceil(page_size);
    let current_page = view.page.clamp(1, total_pages.max(1));

    let start = (current_page - 1) * page_size;
    let items = kept
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    ProjectedView {
        items,
        total_count,
        total_pages,
        current_page,
        has_previous: current_page > 1,
        has_next: current_page < total_pages,
        pages: page_window(current_page, total_pages),
    }
}

/// Numbered page links with gaps, as shown under the grid
///
/// Returns an empty window when everything fits on one page.
pub fn page_window(current_page: usize, total_pages: usize) -> Vec<PageMarker> {
    use PageMarker::{Gap, Page};

    if total_pages <= 1 {
        return Vec::new();
    }
    if total_pages <= MAX_PAGE_LINKS {
        return (1..=total_pages).map(Page).collect();
    }

    let current = current_page.clamp(1, total_pages);
    let last = total_pages;
    if current <= 3 {
        vec![Page(1), Page(2), Page(3), Page(4), Gap, Page(last)]
    } else if current >= last - 2 {
        vec![Page(1), Gap, Page(last - 3), Page(last - 2), Page(last - 1), Page(last)]
    } else {
        vec![
            Page(1),
            Gap,
            Page(current - 1),
            Page(current),
            Page(current + 1),
            Gap,
            Page(last),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn photo(id: &str, title: &str, tags: &[&str], day: Option<u32>) -> PhotoRecord {
        let date = day.map(|d| Utc.with_ymd_and_hms(2024, 5, d, 12, 0, 0).unwrap());
        PhotoRecord {
            id: id.to_string(),
            title: title.to_string(),
            author_raw: String::new(),
            author_name: "unknown author".to_string(),
            link: format!("https://www.flickr.com/photos/x/{id}/"),
            thumbnail_url: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            published_at: date,
            taken_at: None,
            sort_date: date,
            formatted_date: None,
            description: None,
        }
    }

    fn ids(view: &ProjectedView) -> Vec<&str> {
        view.items.iter().map(|r| r.id.as_str()).collect()
    }

    fn params(sort_mode: SortMode, content_filter: ContentFilter, page: usize, page_size: usize) -> ViewParameters {
        ViewParameters {
            sort_mode,
            content_filter,
            page,
            page_size,
        }
    }

    fn sample() -> Vec<PhotoRecord> {
        vec![
            photo("a", "Beach", &["sea"], Some(3)),
            photo("b", "My Screenshot", &[], Some(10)),
            photo("c", "Forest walk", &["trees"], None),
            photo("d", "Desktop", &["Capture", "ui"], Some(1)),
            photo("e", "Hills", &[], Some(7)),
        ]
    }

    #[test]
    fn test_relevance_keeps_feed_order() {
        let view = project(&sample(), &params(SortMode::Relevance, ContentFilter::All, 1, 10));
        assert_eq!(ids(&view), vec!["a", "b", "c", "d", "e"]);
        assert_eq!(view.total_count, 5);
        assert_eq!(view.total_pages, 1);
        assert!(view.pages.is_empty());
    }

    #[test]
    fn test_date_desc_orders_and_puts_undated_last() {
        let view = project(&sample(), &params(SortMode::DateDesc, ContentFilter::All, 1, 10));
        assert_eq!(ids(&view), vec!["b", "e", "a", "d", "c"]);

        let dates: Vec<_> = view.items.iter().filter_map(|r| r.sort_date).collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_date_asc_puts_undated_last() {
        let view = project(&sample(), &params(SortMode::DateAsc, ContentFilter::All, 1, 10));
        assert_eq!(ids(&view), vec!["d", "a", "e", "b", "c"]);
    }

    #[test]
    fn test_date_sort_is_stable() {
        let results = vec![
            photo("x", "", &[], Some(5)),
            photo("n1", "", &[], None),
            photo("y", "", &[], Some(5)),
            photo("n2", "", &[], None),
        ];
        let view = project(&results, &params(SortMode::DateDesc, ContentFilter::All, 1, 10));
        assert_eq!(ids(&view), vec!["x", "y", "n1", "n2"]);
    }

    #[test]
    fn test_interestingness_by_title_length() {
        let view = project(&sample(), &params(SortMode::Interestingness, ContentFilter::All, 1, 10));
        assert_eq!(ids(&view), vec!["b", "c", "d", "a", "e"]);
    }

    #[test]
    fn test_content_filters() {
        let photos = project(&sample(), &params(SortMode::Relevance, ContentFilter::PhotosOnly, 1, 10));
        assert_eq!(ids(&photos), vec!["a", "c", "e"]);

        let shots = project(&sample(), &params(SortMode::Relevance, ContentFilter::Screenshots, 1, 10));
        assert_eq!(ids(&shots), vec!["b", "d"]);
        assert_eq!(shots.total_count, 2);
    }

    #[test]
    fn test_paging_slices() {
        let first = project(&sample(), &params(SortMode::Relevance, ContentFilter::All, 1, 2));
        assert_eq!(ids(&first), vec!["a", "b"]);
        assert_eq!(first.total_pages, 3);
        assert!(!first.has_previous);
        assert!(first.has_next);

        let last = project(&sample(), &params(SortMode::Relevance, ContentFilter::All, 3, 2));
        assert_eq!(ids(&last), vec!["e"]);
        assert!(last.has_previous);
        assert!(!last.has_next);
    }

    #[test]
    fn test_page_past_end_clamps_to_last_page() {
        let clamped = project(&sample(), &params(SortMode::Relevance, ContentFilter::All, 99, 2));
        let last = project(&sample(), &params(SortMode::Relevance, ContentFilter::All, 3, 2));
        assert_eq!(clamped.current_page, 3);
        assert_eq!(ids(&clamped), ids(&last));
    }

    #[test]
    fn test_page_counts_follow_filter() {
        // page 3 exists unfiltered but not after keeping only screenshots
        let view = project(&sample(), &params(SortMode::Relevance, ContentFilter::Screenshots, 3, 2));
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.current_page, 1);
        assert_eq!(ids(&view), vec!["b", "d"]);
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let view = project(&sample(), &params(SortMode::Relevance, ContentFilter::All, 0, 2));
        assert_eq!(view.current_page, 1);
        assert_eq!(ids(&view), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_results() {
        let view = project(&[], &ViewParameters::default());
        assert!(view.items.is_empty());
        assert_eq!(view.total_count, 0);
        assert_eq!(view.total_pages, 0);
        assert_eq!(view.current_page, 1);
        assert!(!view.has_next);
    }

    #[test]
    fn test_page_window_shapes() {
        use PageMarker::{Gap, Page};

        assert!(page_window(1, 1).is_empty());
        assert_eq!(page_window(2, 4), vec![Page(1), Page(2), Page(3), Page(4)]);
        assert_eq!(
            page_window(2, 10),
            vec![Page(1), Page(2), Page(3), Page(4), Gap, Page(10)]
        );
        assert_eq!(
            page_window(9, 10),
            vec![Page(1), Gap, Page(7), Page(8), Page(9), Page(10)]
        );
        assert_eq!(
            page_window(5, 10),
            vec![Page(1), Gap, Page(4), Page(5), Page(6), Gap, Page(10)]
        );
    }
}
