//! Read models derived from a snapshot
//!
//! Front ends never sort or filter on their own: they build a [`ViewFilter`]
//! and ask for the matching links here, so every surface shows the same order.

use std::fmt;

use crate::models::{LinkItem, Snapshot, ALL_CATEGORY_ID};
use crate::ordering;

/// Which category a view covers
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CategoryScope {
    /// Every link, regardless of category
    #[default]
    All,
    Category(String),
}

impl CategoryScope {
    /// `"all"` selects every category; anything else names one
    pub fn parse(value: &str) -> Self {
        if value == ALL_CATEGORY_ID {
            CategoryScope::All
        } else {
            CategoryScope::Category(value.to_string())
        }
    }

    pub fn contains(&self, link: &LinkItem) -> bool {
        match self {
            CategoryScope::All => true,
            CategoryScope::Category(id) => link.category_id == *id,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CategoryScope::All => ALL_CATEGORY_ID,
            CategoryScope::Category(id) => id,
        }
    }
}

impl From<&str> for CategoryScope {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl fmt::Display for CategoryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category scope plus an optional search query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewFilter {
    pub scope: CategoryScope,
    pub query: Option<String>,
}

impl ViewFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(id: impl Into<String>) -> Self {
        Self {
            scope: CategoryScope::Category(id.into()),
            query: None,
        }
    }

    pub fn with_scope(mut self, scope: CategoryScope) -> Self {
        self.scope = scope;
        self
    }

    /// Blank queries are dropped
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.query = if query.trim().is_empty() {
            None
        } else {
            Some(query)
        };
        self
    }

    pub fn matches(&self, link: &LinkItem) -> bool {
        self.scope.contains(link)
            && self
                .query
                .as_deref()
                .map_or(true, |q| link.matches_query(q))
    }
}

/// Links matching `filter`, in display order
pub fn display_links<'a>(snapshot: &'a Snapshot, filter: &ViewFilter) -> Vec<&'a LinkItem> {
    let mut links: Vec<&LinkItem> = snapshot.links.iter().filter(|l| filter.matches(l)).collect();
    ordering::sort_for_display(&mut links);
    links
}

pub fn all_links(snapshot: &Snapshot) -> Vec<&LinkItem> {
    display_links(snapshot, &ViewFilter::all())
}

pub fn links_in_category<'a>(snapshot: &'a Snapshot, category_id: &str) -> Vec<&'a LinkItem> {
    display_links(snapshot, &ViewFilter::category(category_id))
}

/// Case-insensitive search across every category
pub fn search_links<'a>(snapshot: &'a Snapshot, query: &str) -> Vec<&'a LinkItem> {
    display_links(snapshot, &ViewFilter::all().with_query(query))
}

/// The pinned section, in pinned order
pub fn pinned_links(snapshot: &Snapshot) -> Vec<&LinkItem> {
    let mut links: Vec<&LinkItem> = snapshot.links.iter().filter(|l| l.pinned).collect();
    ordering::sort_pinned(&mut links);
    links
}

/// Link counts per category, in category order
pub fn category_counts(snapshot: &Snapshot) -> Vec<(&str, usize)> {
    snapshot
        .categories
        .iter()
        .map(|c| {
            let count = snapshot
                .links
                .iter()
                .filter(|l| l.category_id == c.id)
                .count();
            (c.id.as_str(), count)
        })
        .collect()
}
