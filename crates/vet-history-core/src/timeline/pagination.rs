//! Timeline pagination and the stateful list view.

use serde::Serialize;

use super::{build_timeline, filter_timeline, TimelineFilter, TimelineItem};
use crate::error::{AnalysisError, AnalysisResult};
use crate::models::HistorialSnapshot;

/// One page of results. Pages are 1-indexed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// Page actually returned (after clamping)
    pub page: usize,
    /// Requested page size
    pub page_size: usize,
    /// Number of pages; 0 when there are no items
    pub total_pages: usize,
    /// Number of items across all pages
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice out one page.
///
/// Page 0 is read as page 1 and a page past the end returns the last page.
/// A zero page size is rejected.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> AnalysisResult<Page<T>> {
    if page_size == 0 {
        return Err(AnalysisError::InvalidInput("page size must be at least 1".into()));
    }
    Ok(page_of(items, page, page_size))
}

fn page_of<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);
    let page = page.clamp(1, total_pages.max(1));

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);
    let slice = items.get(start..end).unwrap_or_default();

    Page {
        items: slice.to_vec(),
        page,
        page_size,
        total_pages,
        total_items,
    }
}

/// A filtered, paged view over one patient's timeline.
///
/// Changing the filter always returns to page 1.
#[derive(Debug, Clone)]
pub struct TimelineView {
    all: Vec<TimelineItem>,
    filtered: Vec<TimelineItem>,
    filter: TimelineFilter,
    page: usize,
    page_size: usize,
}

impl TimelineView {
    /// Create an unfiltered view positioned on page 1.
    pub fn new(items: Vec<TimelineItem>, page_size: usize) -> AnalysisResult<Self> {
        if page_size == 0 {
            return Err(AnalysisError::InvalidInput("page size must be at least 1".into()));
        }
        let filter = TimelineFilter::default();
        let filtered = filter_timeline(&items, &filter);
        Ok(Self {
            all: items,
            filtered,
            filter,
            page: 1,
            page_size,
        })
    }

    /// Build the timeline of a snapshot and wrap it in a view.
    pub fn from_historial(historial: &HistorialSnapshot, page_size: usize) -> AnalysisResult<Self> {
        Self::new(build_timeline(historial), page_size)
    }

    /// Apply new criteria and go back to page 1.
    pub fn set_filter(&mut self, filter: TimelineFilter) {
        self.filtered = filter_timeline(&self.all, &filter);
        self.filter = filter;
        self.page = 1;
    }

    /// Move to a page (clamped when read).
    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn filter(&self) -> &TimelineFilter {
        &self.filter
    }

    /// Every item matching the current filter.
    pub fn filtered(&self) -> &[TimelineItem] {
        &self.filtered
    }

    /// Total items before filtering.
    pub fn total_items(&self) -> usize {
        self.all.len()
    }

    pub fn current_page(&self) -> Page<TimelineItem> {
        page_of(&self.filtered, self.page, self.page_size)
    }
}
