//! Data models for LinkDeck
//!
//! Defines the core data structures: LinkItem, Category, and the Snapshot
//! that pairs them. Field names serialize in camelCase so persisted files and
//! backup bundles keep the `{links, categories}` document shape.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fallback category. Always present; receives links of deleted categories.
pub const COMMON_CATEGORY_ID: &str = "common";

/// Virtual "every category" filter. Never stored as an assignment.
pub const ALL_CATEGORY_ID: &str = "all";

/// Current time as Unix epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a fresh identifier for links and categories
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A saved link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkItem {
    /// Unique identifier, immutable after creation
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// Owning category
    pub category_id: String,
    /// Creation time (epoch millis); display fallback when `order` is unset
    pub created_at: i64,
    /// Manual display position, ascending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(default)]
    pub pinned: bool,
    /// Position among pinned links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned_order: Option<i64>,
}

impl LinkItem {
    /// Create an unpinned link with a fresh id, stamped now
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self::with_id(new_id(), title, url, category_id)
    }

    /// Create a link with a specific ID (for imports and tests)
    pub fn with_id(
        id: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
            description: None,
            icon: None,
            category_id: category_id.into(),
            created_at: now_millis(),
            order: None,
            pinned: false,
            pinned_order: None,
        }
    }

    /// Sort key for display: `order` when set, else `created_at`
    pub fn effective_order(&self) -> i64 {
        self.order.unwrap_or(self.created_at)
    }

    /// Case-insensitive match against title, url and description
    pub fn matches_query(&self, query: &str) -> bool {
        let q = query.trim().to_lowercase();
        if q.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&q)
            || self.url.to_lowercase().contains(&q)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&q))
    }
}

/// User-supplied fields for a new link
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LinkDraft {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    pub category_id: String,
}

impl LinkDraft {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            description: None,
            icon: None,
            category_id: category_id.into(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }
}

/// Replacement fields for an existing link
///
/// Ordering fields are only touched when supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkUpdate {
    pub id: String,
    pub draft: LinkDraft,
    pub order: Option<i64>,
    pub pinned_order: Option<i64>,
}

impl LinkUpdate {
    pub fn new(id: impl Into<String>, draft: LinkDraft) -> Self {
        Self {
            id: id.into(),
            draft,
            order: None,
            pinned_order: None,
        }
    }

    /// Start an update from a link's current values
    pub fn from_link(link: &LinkItem) -> Self {
        Self::new(
            link.id.clone(),
            LinkDraft {
                title: link.title.clone(),
                url: link.url.clone(),
                description: link.description.clone(),
                icon: link.icon.clone(),
                category_id: link.category_id.clone(),
            },
        )
    }
}

/// A named group of links
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// The built-in fallback category
    pub fn common() -> Self {
        Self::new(COMMON_CATEGORY_ID, "Common").with_icon("Star")
    }

    /// Whether this id is reserved (cannot be deleted or stored freely)
    pub fn is_reserved_id(id: &str) -> bool {
        id == COMMON_CATEGORY_ID || id == ALL_CATEGORY_ID
    }
}

/// The full `(links, categories)` pair, persisted and published as one unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    #[serde(default)]
    pub links: Vec<LinkItem>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            links: Vec::new(),
            categories: vec![Category::common()],
        }
    }
}

impl Snapshot {
    pub fn new(links: Vec<LinkItem>, categories: Vec<Category>) -> Self {
        Self { links, categories }
    }

    pub fn link(&self, id: &str) -> Option<&LinkItem> {
        self.links.iter().find(|l| l.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Whether a link may be assigned to `category_id`
    pub fn category_resolves(&self, category_id: &str) -> bool {
        category_id == COMMON_CATEGORY_ID || self.category(category_id).is_some()
    }

    /// Largest effective order over all links
    pub fn max_effective_order(&self) -> Option<i64> {
        self.links.iter().map(LinkItem::effective_order).max()
    }

    /// Order value that sorts after every existing link
    ///
    /// `None` when the largest order is already `i64::MAX`.
    pub fn next_order(&self) -> Option<i64> {
        match self.max_effective_order() {
            Some(max) => max.checked_add(1),
            None => Some(0),
        }
    }

    pub fn pinned_count(&self) -> usize {
        self.links.iter().filter(|l| l.pinned).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_new() {
        let link = LinkItem::new("Example", "https://example.com", "work");
        assert_eq!(link.url, "https://example.com");
        assert_eq!(link.title, "Example");
        assert_eq!(link.category_id, "work");
        assert!(!link.pinned);
        assert!(link.order.is_none());
        assert!(link.pinned_order.is_none());
        assert!(!link.id.is_empty());
    }

    #[test]
    fn test_effective_order_falls_back_to_created_at() {
        let mut link = LinkItem::with_id("a", "A", "https://a.com", "common");
        link.created_at = 1_700_000_000_000;
        assert_eq!(link.effective_order(), 1_700_000_000_000);

        link.order = Some(3);
        assert_eq!(link.effective_order(), 3);
    }

    #[test]
    fn test_matches_query() {
        let mut link = LinkItem::with_id("a", "Rust Lang", "https://rust-lang.org", "dev");
        link.description = Some("Systems programming".to_string());

        assert!(link.matches_query("rust"));
        assert!(link.matches_query("RUST-LANG.ORG"));
        assert!(link.matches_query("programming"));
        assert!(link.matches_query("   "));
        assert!(!link.matches_query("python"));
    }

    #[test]
    fn test_default_snapshot_has_fallback() {
        let snapshot = Snapshot::default();
        assert!(snapshot.links.is_empty());
        assert_eq!(snapshot.categories.len(), 1);
        assert_eq!(snapshot.categories[0].id, COMMON_CATEGORY_ID);
    }

    #[test]
    fn test_category_resolves() {
        let snapshot = Snapshot::new(Vec::new(), vec![Category::new("work", "Work")]);
        assert!(snapshot.category_resolves("work"));
        assert!(snapshot.category_resolves(COMMON_CATEGORY_ID));
        assert!(!snapshot.category_resolves(ALL_CATEGORY_ID));
        assert!(!snapshot.category_resolves("missing"));
    }

    #[test]
    fn test_next_order() {
        let mut snapshot = Snapshot::default();
        assert_eq!(snapshot.next_order(), Some(0));

        let mut a = LinkItem::with_id("a", "A", "https://a.com", "common");
        a.order = Some(4);
        snapshot.links.push(a);
        assert_eq!(snapshot.next_order(), Some(5));

        snapshot.links[0].order = Some(i64::MAX);
        assert_eq!(snapshot.next_order(), None);
    }

    #[test]
    fn test_reserved_ids() {
        assert!(Category::is_reserved_id("common"));
        assert!(Category::is_reserved_id("all"));
        assert!(!Category::is_reserved_id("work"));
    }

    #[test]
    fn test_snapshot_json_shape() {
        let mut link = LinkItem::with_id("1", "One", "https://one.com", "common");
        link.created_at = 10;
        link.pinned = true;
        link.pinned_order = Some(0);
        let snapshot = Snapshot::new(vec![link], vec![Category::common()]);

        let json = serde_json::to_value(&snapshot).unwrap();
        let first = &json["links"][0];
        assert_eq!(first["categoryId"], "common");
        assert_eq!(first["createdAt"], 10);
        assert_eq!(first["pinnedOrder"], 0);
        assert!(first.get("order").is_none());
    }

    #[test]
    fn test_deserialize_missing_optional_fields() {
        let json = r#"{
            "links": [{"id": "x", "title": "X", "url": "https://x.com", "categoryId": "common", "createdAt": 5}],
            "categories": [{"id": "common", "name": "Common"}]
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert!(!snapshot.links[0].pinned);
        assert!(snapshot.links[0].order.is_none());
        assert!(snapshot.categories[0].icon.is_none());
    }
}
