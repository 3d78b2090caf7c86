//! Timeline filtering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{sort_timeline, TimelineItem};
use crate::dates;
use crate::models::Category;

/// Timestamp ordering of a filtered timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Newest first
    #[default]
    Descending,
    /// Oldest first
    Ascending,
}

/// Category criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    One(Category),
}

impl CategoryFilter {
    fn accepts(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::One(wanted) => *wanted == category,
        }
    }
}

/// Timeline filter criteria. Every set criterion must match.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineFilter {
    /// Case-insensitive substring of title or subtitle; blank matches all
    pub query: String,
    /// Category restriction
    pub category: CategoryFilter,
    /// Inclusive lower bound, from the start of that day
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound, through the end of that day
    pub date_to: Option<NaiveDate>,
    /// Output ordering
    pub order: SortOrder,
}

impl TimelineFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = CategoryFilter::One(category);
        self
    }

    pub fn between(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    pub fn ordered(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Check if an item satisfies every criterion.
    pub fn matches(&self, item: &TimelineItem) -> bool {
        self.matches_query(item)
            && self.category.accepts(item.category)
            && self.matches_dates(item)
    }

    fn matches_query(&self, item: &TimelineItem) -> bool {
        let needle = self.query.trim();
        if needle.is_empty() {
            return true;
        }
        let needle = needle.to_lowercase();
        item.title.to_lowercase().contains(&needle)
            || item.subtitle.to_lowercase().contains(&needle)
    }

    fn matches_dates(&self, item: &TimelineItem) -> bool {
        if let Some(from) = self.date_from {
            if item.timestamp < dates::start_of_day(from) {
                return false;
            }
        }
        if let Some(to) = self.date_to {
            if item.timestamp > dates::end_of_day(to) {
                return false;
            }
        }
        true
    }
}

/// Keep the items matching `criteria`, sorted by `criteria.order`.
///
/// Idempotent: filtering the result again with the same criteria returns it
/// unchanged.
pub fn filter_timeline(items: &[TimelineItem], criteria: &TimelineFilter) -> Vec<TimelineItem> {
    let mut matched: Vec<TimelineItem> = items
        .iter()
        .filter(|item| criteria.matches(item))
        .cloned()
        .collect();
    sort_timeline(&mut matched, criteria.order);
    matched
}
