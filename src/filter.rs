use std::cmp::Ordering;
use std::sync::Arc;

use crate::api::{Category, Channel};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    /// Parse a `<select>` value; `"all"` and the empty string mean no filter.
    pub fn from_value(value: &str) -> Self {
        match value.trim() {
            "" | "all" => CategoryFilter::All,
            other => CategoryFilter::Only(Category::from(other)),
        }
    }

    pub fn matches(&self, channel: &Channel) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(cat) => &channel.category == cat,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Live,
    TwentyFourHour,
}

impl StatusFilter {
    /// Unknown values fall back to `All`.
    pub fn from_value(value: &str) -> Self {
        match value.trim() {
            "live" => StatusFilter::Live,
            "24h" => StatusFilter::TwentyFourHour,
            _ => StatusFilter::All,
        }
    }

    pub fn matches(&self, channel: &Channel) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Live => channel.is_live(),
            StatusFilter::TwentyFourHour => channel.channel_type == "24h",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub category: CategoryFilter,
    pub status: StatusFilter,
    pub query: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Search text as it is matched: trimmed and lower-cased.
    pub fn normalized_query(&self) -> String {
        self.query.trim().to_lowercase()
    }
}

fn matches_query(channel: &Channel, query: &str) -> bool {
    channel.name.to_lowercase().contains(query)
        || channel.description.to_lowercase().contains(query)
        || channel.category.as_str().to_lowercase().contains(query)
}

/// Live channels first, then by name ignoring case. Raw name and id break
/// the remaining ties so the order is total.
pub fn compare_channels(a: &Channel, b: &Channel) -> Ordering {
    b.is_live()
        .cmp(&a.is_live())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.id.cmp(&b.id))
}

/// Channels to show for `filter`, sorted for display. `all` is untouched.
pub fn visible_channels(all: &[Arc<Channel>], filter: &FilterState) -> Vec<Arc<Channel>> {
    let query = filter.normalized_query();

    let mut visible: Vec<Arc<Channel>> = all
        .iter()
        .filter(|c| filter.category.matches(c))
        .filter(|c| filter.status.matches(c))
        .filter(|c| query.is_empty() || matches_query(c, &query))
        .cloned()
        .collect();

    visible.sort_by(|a, b| compare_channels(a, b));
    visible
}
