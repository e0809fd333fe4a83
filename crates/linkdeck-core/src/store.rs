//! The bookmark store
//!
//! `BookmarkStore` owns the canonical `(links, categories)` snapshot. Every
//! mutation follows the same path:
//!
//! 1. validate the request against the current snapshot
//! 2. build a complete new snapshot with consistent ordering fields
//! 3. persist it through the [`SnapshotPersistence`] port
//! 4. publish it to subscribers
//!
//! A rejected request returns a [`StoreError`] and leaves the snapshot
//! untouched. A failed write does not roll back: the store keeps the new
//! state in memory and reports [`PersistenceHealth::Degraded`].
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = BookmarkStore::open(&config);
//! let link = store.add_link(LinkDraft::new("Rust", "https://rust-lang.org", "common"))?;
//! store.toggle_pin(&link.id)?;
//! let pinned = view::pinned_links(&store.snapshot());
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    new_id, now_millis, Category, LinkDraft, LinkItem, LinkUpdate, Snapshot, ALL_CATEGORY_ID,
    COMMON_CATEGORY_ID,
};
use crate::ordering;
use crate::storage::{JsonFilePersistence, SnapshotPersistence, StorageError};
use crate::view::{self, CategoryScope, ViewFilter};

/// Outcome of the most recent write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceHealth {
    Healthy,
    /// Last write failed; the in-memory snapshot is ahead of storage
    Degraded {
        reason: String,
        hint: Option<&'static str>,
    },
}

impl PersistenceHealth {
    pub fn is_healthy(&self) -> bool {
        matches!(self, PersistenceHealth::Healthy)
    }
}

/// Ordered bookmark store
pub struct BookmarkStore {
    snapshot: Arc<Snapshot>,
    persistence: Box<dyn SnapshotPersistence + Send>,
    publisher: watch::Sender<Arc<Snapshot>>,
    health: PersistenceHealth,
}

impl BookmarkStore {
    /// Open the store backed by the configured JSON file
    pub fn open(config: &Config) -> Self {
        Self::open_with(JsonFilePersistence::new(config))
    }

    /// Open the store on any persistence backend
    ///
    /// Missing or unreadable data yields the default snapshot. Readable data
    /// that breaks an invariant is repaired.
    pub fn open_with(persistence: impl SnapshotPersistence + Send + 'static) -> Self {
        let snapshot = match persistence.load() {
            Ok(Some(stored)) => {
                let (repaired, changed) = repair(stored);
                if changed {
                    warn!(
                        "Stored snapshot at {} violated store invariants and was repaired",
                        persistence.describe()
                    );
                }
                repaired
            }
            Ok(None) => {
                debug!("No stored snapshot at {}, starting empty", persistence.describe());
                Snapshot::default()
            }
            Err(e @ StorageError::CorruptDocument { .. }) => {
                warn!("{}", e);
                Snapshot::default()
            }
            Err(e) => {
                warn!("Could not read snapshot, starting empty: {}", e);
                Snapshot::default()
            }
        };

        let snapshot = Arc::new(snapshot);
        let (publisher, _) = watch::channel(Arc::clone(&snapshot));

        Self {
            snapshot,
            persistence: Box::new(persistence),
            publisher,
            health: PersistenceHealth::Healthy,
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn links(&self) -> &[LinkItem] {
        &self.snapshot.links
    }

    pub fn categories(&self) -> &[Category] {
        &self.snapshot.categories
    }

    pub fn get_link(&self, id: &str) -> Option<&LinkItem> {
        self.snapshot.link(id)
    }

    pub fn get_category(&self, id: &str) -> Option<&Category> {
        self.snapshot.category(id)
    }

    /// Receive every snapshot published after a successful mutation
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.publisher.subscribe()
    }

    pub fn persistence_health(&self) -> &PersistenceHealth {
        &self.health
    }

    /// Where the snapshot is stored
    pub fn storage_location(&self) -> String {
        self.persistence.describe()
    }

    // ==================== Link Operations ====================

    /// Add a link at the end of every view
    pub fn add_link(&mut self, draft: LinkDraft) -> StoreResult<LinkItem> {
        let draft = clean_draft(draft);
        validate_draft(&self.snapshot, &draft)?;

        let mut next = self.working_copy();
        let mut link = LinkItem::new(draft.title, draft.url, draft.category_id);
        link.description = draft.description;
        link.icon = draft.icon;
        link.order = Some(reserve_orders(&mut next, 1));
        next.links.push(link.clone());

        debug!("Adding link {} ({})", link.id, link.url);
        self.commit(next);
        Ok(link)
    }

    /// Replace a link's editable fields
    pub fn update_link(&mut self, update: LinkUpdate) -> StoreResult<LinkItem> {
        let draft = clean_draft(update.draft);
        let idx = self.link_index(&update.id)?;
        validate_draft(&self.snapshot, &draft)?;

        if update.pinned_order.is_some() && !self.snapshot.links[idx].pinned {
            return Err(StoreError::InvalidOperation(format!(
                "link {} is not pinned",
                update.id
            )));
        }

        let mut next = self.working_copy();
        {
            let link = &mut next.links[idx];
            link.title = draft.title;
            link.url = draft.url;
            link.description = draft.description;
            link.icon = draft.icon;
            link.category_id = draft.category_id;
            if let Some(order) = update.order {
                link.order = Some(order);
            }
        }

        if let Some(position) = update.pinned_order {
            let mut sequence: Vec<String> = ordering::pinned_sequence(&next.links)
                .into_iter()
                .filter(|id| *id != update.id)
                .collect();
            let at = usize::try_from(position).unwrap_or(0).min(sequence.len());
            sequence.insert(at, update.id.clone());
            ordering::apply_pinned_sequence(&mut next.links, &sequence);
        }

        let updated = next.links[idx].clone();
        debug!("Updated link {}", updated.id);
        self.commit(next);
        Ok(updated)
    }

    /// Remove a link
    pub fn delete_link(&mut self, id: &str) -> StoreResult<LinkItem> {
        let idx = self.link_index(id)?;

        let mut next = self.working_copy();
        let removed = next.links.remove(idx);
        ordering::compact_pinned(&mut next.links);

        debug!("Deleted link {}", id);
        self.commit(next);
        Ok(removed)
    }

    /// Remove several links at once; any unknown id rejects the whole batch
    pub fn delete_links(&mut self, ids: &[String]) -> StoreResult<usize> {
        let selected = self.resolve_selection(ids)?;

        let mut next = self.working_copy();
        next.links.retain(|l| !selected.contains(l.id.as_str()));
        ordering::compact_pinned(&mut next.links);

        debug!("Deleted {} links", selected.len());
        self.commit(next);
        Ok(selected.len())
    }

    /// Reassign several links to one category
    pub fn move_links(&mut self, ids: &[String], category_id: &str) -> StoreResult<usize> {
        validate_category_ref(&self.snapshot, category_id)?;
        let selected = self.resolve_selection(ids)?;

        let mut next = self.working_copy();
        for link in next.links.iter_mut() {
            if selected.contains(link.id.as_str()) {
                link.category_id = category_id.to_string();
            }
        }

        debug!("Moved {} links to {}", selected.len(), category_id);
        self.commit(next);
        Ok(selected.len())
    }

    /// Flip a link's pinned flag, returning the new state
    ///
    /// Pinning appends to the end of the pinned section. Unpinning clears the
    /// link's `pinned_order` and closes the gap it leaves.
    pub fn toggle_pin(&mut self, id: &str) -> StoreResult<bool> {
        let idx = self.link_index(id)?;

        let mut next = self.working_copy();
        let pinned = !next.links[idx].pinned;
        if pinned {
            ordering::compact_pinned(&mut next.links);
            let position = next.pinned_count() as i64;
            let link = &mut next.links[idx];
            link.pinned = true;
            link.pinned_order = Some(position);
        } else {
            let link = &mut next.links[idx];
            link.pinned = false;
            link.pinned_order = None;
            ordering::compact_pinned(&mut next.links);
        }

        debug!("Link {} pinned={}", id, pinned);
        self.commit(next);
        Ok(pinned)
    }

    /// Drag `moved` onto `target` within a category (or every category)
    ///
    /// Returns false, publishing nothing, when the ids are equal or either is
    /// outside the scope.
    pub fn reorder_links(&mut self, moved: &str, target: &str, scope: &CategoryScope) -> bool {
        self.reorder_links_in_view(moved, target, &ViewFilter::all().with_scope(scope.clone()))
    }

    /// Drag within exactly the links a filtered view shows
    ///
    /// The visible links are renumbered `0..n-1` in their new order; hidden
    /// links keep their `order`.
    pub fn reorder_links_in_view(&mut self, moved: &str, target: &str, filter: &ViewFilter) -> bool {
        let visible: Vec<&str> = view::display_links(&self.snapshot, filter)
            .into_iter()
            .map(|l| l.id.as_str())
            .collect();

        let Some(sequence) = ordering::move_item(&visible, moved, target) else {
            return false;
        };

        let mut next = self.working_copy();
        ordering::apply_order_sequence(&mut next.links, &sequence);

        debug!("Reordered {} links in scope {}", sequence.len(), filter.scope);
        self.commit(next);
        true
    }

    /// Drag within the pinned section
    pub fn reorder_pinned_links(&mut self, moved: &str, target: &str) -> bool {
        let current = ordering::pinned_sequence(&self.snapshot.links);
        let Some(sequence) = ordering::move_item(&current, moved, target) else {
            return false;
        };

        let mut next = self.working_copy();
        ordering::apply_pinned_sequence(&mut next.links, &sequence);

        debug!("Reordered {} pinned links", sequence.len());
        self.commit(next);
        true
    }

    // ==================== Category Operations ====================

    /// Append a new category
    pub fn add_category(&mut self, name: &str, icon: Option<String>) -> StoreResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("category name must not be empty".into()));
        }

        let mut next = self.working_copy();
        let category = Category {
            id: new_id(),
            name: name.to_string(),
            icon: icon.filter(|i| !i.trim().is_empty()),
        };
        next.categories.push(category.clone());

        debug!("Added category {} ({})", category.id, category.name);
        self.commit(next);
        Ok(category)
    }

    /// Rename a category or change its icon
    pub fn update_category(
        &mut self,
        id: &str,
        name: &str,
        icon: Option<String>,
    ) -> StoreResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Validation("category name must not be empty".into()));
        }
        let idx = self
            .snapshot
            .categories
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| StoreError::category_not_found(id))?;

        let mut next = self.working_copy();
        let category = &mut next.categories[idx];
        category.name = name.to_string();
        category.icon = icon.filter(|i| !i.trim().is_empty());
        let updated = category.clone();

        self.commit(next);
        Ok(updated)
    }

    /// Drag `moved` onto `target` in the category list
    pub fn reorder_categories(&mut self, moved: &str, target: &str) -> bool {
        let current: Vec<&str> = self.snapshot.categories.iter().map(|c| c.id.as_str()).collect();
        let Some(sequence) = ordering::move_item(&current, moved, target) else {
            return false;
        };

        let mut next = self.working_copy();
        next.categories.sort_by_key(|c| {
            sequence
                .iter()
                .position(|id| *id == c.id)
                .unwrap_or(usize::MAX)
        });

        self.commit(next);
        true
    }

    /// Remove a category, moving its links to the fallback category
    ///
    /// Returns how many links were moved.
    pub fn delete_category(&mut self, id: &str) -> StoreResult<usize> {
        if Category::is_reserved_id(id) {
            return Err(StoreError::InvalidOperation(format!(
                "category '{}' is reserved and cannot be deleted",
                id
            )));
        }
        if self.snapshot.category(id).is_none() {
            return Err(StoreError::category_not_found(id));
        }

        let mut next = self.working_copy();
        next.categories.retain(|c| c.id != id);
        let mut moved = 0;
        for link in next.links.iter_mut().filter(|l| l.category_id == id) {
            link.category_id = COMMON_CATEGORY_ID.to_string();
            moved += 1;
        }
        ensure_fallback_category(&mut next.categories);

        debug!("Deleted category {}, moved {} links to fallback", id, moved);
        self.commit(next);
        Ok(moved)
    }

    // ==================== Bulk Operations ====================

    /// Merge an external snapshot into the current one
    ///
    /// Categories merge by id. Links are appended unless their id or URL is
    /// already present; appended links sort after everything existing.
    /// Returns the number of links added.
    pub fn import_data(
        &mut self,
        links: Vec<LinkItem>,
        categories: Vec<Category>,
    ) -> StoreResult<usize> {
        validate_categories(&categories)?;

        let mut next = self.working_copy();
        for incoming in categories {
            match next.categories.iter_mut().find(|c| c.id == incoming.id) {
                Some(existing) => {
                    existing.name = incoming.name;
                    existing.icon = incoming.icon;
                }
                None => next.categories.push(incoming),
            }
        }

        ordering::compact_pinned(&mut next.links);
        let mut known_ids: HashSet<String> = next.links.iter().map(|l| l.id.clone()).collect();
        let mut known_urls: HashSet<String> =
            next.links.iter().map(|l| l.url.trim().to_string()).collect();
        let mut order = reserve_orders(&mut next, links.len());
        let mut pinned_position = next.pinned_count() as i64;
        let mut added = 0;

        for mut link in links {
            link.title = link.title.trim().to_string();
            link.url = link.url.trim().to_string();
            if link.title.is_empty() || link.url.is_empty() {
                debug!("Skipping import candidate with empty title or url");
                continue;
            }
            if link.id.is_empty() {
                link.id = new_id();
            }
            if known_ids.contains(&link.id) || known_urls.contains(&link.url) {
                debug!("Skipping duplicate link {} ({})", link.id, link.url);
                continue;
            }
            if !next.category_resolves(&link.category_id) {
                link.category_id = COMMON_CATEGORY_ID.to_string();
            }
            if link.created_at <= 0 {
                link.created_at = now_millis();
            }

            link.order = Some(order);
            order += 1;
            link.pinned_order = if link.pinned {
                pinned_position += 1;
                Some(pinned_position - 1)
            } else {
                None
            };

            known_ids.insert(link.id.clone());
            known_urls.insert(link.url.clone());
            next.links.push(link);
            added += 1;
        }

        if next == *self.snapshot {
            debug!("Import changed nothing");
            return Ok(0);
        }

        debug!("Imported {} links", added);
        self.commit(next);
        Ok(added)
    }

    /// Replace the whole snapshot
    ///
    /// The new data is validated first; the pinned sequence is re-densified
    /// and the fallback category restored if missing.
    pub fn update_data(
        &mut self,
        links: Vec<LinkItem>,
        categories: Vec<Category>,
    ) -> StoreResult<()> {
        validate_categories(&categories)?;
        let mut next = Snapshot::new(links, categories);
        ensure_fallback_category(&mut next.categories);

        let mut ids = HashSet::new();
        for link in &next.links {
            if !ids.insert(link.id.as_str()) {
                return Err(StoreError::Validation(format!("duplicate link id: {}", link.id)));
            }
            if link.id.trim().is_empty() {
                return Err(StoreError::Validation("link id must not be empty".into()));
            }
            if link.title.trim().is_empty() || link.url.trim().is_empty() {
                return Err(StoreError::Validation(format!(
                    "link {} needs a title and a url",
                    link.id
                )));
            }
            if !next.category_resolves(&link.category_id) {
                return Err(StoreError::Validation(format!(
                    "link {} references unknown category: {}",
                    link.id, link.category_id
                )));
            }
        }

        ordering::compact_pinned(&mut next.links);

        debug!(
            "Replaced snapshot: {} links, {} categories",
            next.links.len(),
            next.categories.len()
        );
        self.commit(next);
        Ok(())
    }

    // ==================== Internals ====================

    fn working_copy(&self) -> Snapshot {
        (*self.snapshot).clone()
    }

    fn link_index(&self, id: &str) -> StoreResult<usize> {
        self.snapshot
            .links
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| StoreError::link_not_found(id))
    }

    fn resolve_selection<'a>(&self, ids: &'a [String]) -> StoreResult<HashSet<&'a str>> {
        if ids.is_empty() {
            return Err(StoreError::Validation("no links selected".into()));
        }
        let mut selected = HashSet::new();
        for id in ids {
            self.link_index(id)?;
            selected.insert(id.as_str());
        }
        Ok(selected)
    }

    /// Swap in a new snapshot, persist it, then publish it
    fn commit(&mut self, next: Snapshot) {
        let next = Arc::new(next);

        match self.persistence.save(&next) {
            Ok(()) => self.health = PersistenceHealth::Healthy,
            Err(e) => {
                warn!(
                    "Failed to persist snapshot to {}; continuing in memory: {}",
                    self.persistence.describe(),
                    e
                );
                self.health = PersistenceHealth::Degraded {
                    reason: e.to_string(),
                    hint: e.hint(),
                };
            }
        }

        self.snapshot = Arc::clone(&next);
        self.publisher.send_replace(next);
    }
}

/// First of `count` consecutive orders that sort after every existing link
///
/// When that range would run past `i64::MAX`, every link is first renumbered
/// `0..n-1` in display order.
fn reserve_orders(next: &mut Snapshot, count: usize) -> i64 {
    let count = i64::try_from(count).unwrap_or(i64::MAX);
    if let Some(start) = next.next_order() {
        if start.checked_add(count).is_some() {
            return start;
        }
    }

    let sequence: Vec<String> = view::all_links(next).iter().map(|l| l.id.clone()).collect();
    warn!("Order values exhausted; renumbering {} links", sequence.len());
    ordering::apply_order_sequence(&mut next.links, &sequence);
    sequence.len() as i64
}

/// Trim text fields and drop blank optionals
fn clean_draft(mut draft: LinkDraft) -> LinkDraft {
    draft.title = draft.title.trim().to_string();
    draft.url = draft.url.trim().to_string();
    draft.category_id = draft.category_id.trim().to_string();
    draft.description = draft
        .description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty());
    draft.icon = draft
        .icon
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty());
    draft
}

fn validate_draft(snapshot: &Snapshot, draft: &LinkDraft) -> StoreResult<()> {
    if draft.title.is_empty() {
        return Err(StoreError::Validation("title must not be empty".into()));
    }
    if draft.url.is_empty() {
        return Err(StoreError::Validation("url must not be empty".into()));
    }
    validate_category_ref(snapshot, &draft.category_id)
}

fn validate_category_ref(snapshot: &Snapshot, category_id: &str) -> StoreResult<()> {
    if snapshot.category_resolves(category_id) {
        Ok(())
    } else {
        Err(StoreError::Validation(format!(
            "unknown category: {}",
            category_id
        )))
    }
}

fn validate_categories(categories: &[Category]) -> StoreResult<()> {
    let mut ids = HashSet::new();
    for category in categories {
        if category.id == ALL_CATEGORY_ID {
            return Err(StoreError::InvalidOperation(
                "'all' is a view filter and cannot be stored as a category".into(),
            ));
        }
        if category.id.trim().is_empty() || category.name.trim().is_empty() {
            return Err(StoreError::Validation(
                "category id and name must not be empty".into(),
            ));
        }
        if !ids.insert(category.id.as_str()) {
            return Err(StoreError::Validation(format!(
                "duplicate category id: {}",
                category.id
            )));
        }
    }
    Ok(())
}

fn ensure_fallback_category(categories: &mut Vec<Category>) {
    if !categories.iter().any(|c| c.id == COMMON_CATEGORY_ID) {
        categories.insert(0, Category::common());
    }
}

/// Bring a loaded snapshot back within the store invariants
///
/// Returns the repaired snapshot and whether anything changed.
fn repair(stored: Snapshot) -> (Snapshot, bool) {
    let original = stored.clone();
    let Snapshot { links, categories } = stored;

    let mut seen = HashSet::new();
    let mut categories: Vec<Category> = categories
        .into_iter()
        .filter(|c| c.id != ALL_CATEGORY_ID && seen.insert(c.id.clone()))
        .collect();
    ensure_fallback_category(&mut categories);

    let mut seen = HashSet::new();
    let links: Vec<LinkItem> = links
        .into_iter()
        .filter(|l| seen.insert(l.id.clone()))
        .collect();

    let mut repaired = Snapshot::new(links, categories);
    let known: HashSet<String> = repaired.categories.iter().map(|c| c.id.clone()).collect();
    for link in repaired.links.iter_mut() {
        if !known.contains(&link.category_id) {
            link.category_id = COMMON_CATEGORY_ID.to_string();
        }
    }
    ordering::compact_pinned(&mut repaired.links);

    let changed = repaired != original;
    (repaired, changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPersistence;
    use tempfile::TempDir;

    fn memory_store() -> (BookmarkStore, MemoryPersistence) {
        let handle = MemoryPersistence::new();
        (BookmarkStore::open_with(handle.clone()), handle)
    }

    fn link_with(id: &str, category: &str, order: Option<i64>) -> LinkItem {
        let mut link = LinkItem::with_id(
            id,
            format!("Link {}", id),
            format!("https://{}.example", id),
            category,
        );
        link.order = order;
        link.created_at = 1_000;
        link
    }

    /// Store holding links 1, 2, 3 (orders 0, 1, 2) in "work"
    fn work_store() -> (BookmarkStore, MemoryPersistence) {
        let (mut store, handle) = memory_store();
        store
            .update_data(
                vec![
                    link_with("1", "work", Some(0)),
                    link_with("2", "work", Some(1)),
                    link_with("3", "work", Some(2)),
                ],
                vec![Category::common(), Category::new("work", "Work")],
            )
            .unwrap();
        (store, handle)
    }

    fn display_ids(store: &BookmarkStore, scope: &str) -> Vec<String> {
        let snapshot = store.snapshot();
        view::display_links(&snapshot, &ViewFilter::all().with_scope(CategoryScope::parse(scope)))
            .into_iter()
            .map(|l| l.id.clone())
            .collect()
    }

    fn pinned_orders(store: &BookmarkStore) -> Vec<(String, Option<i64>)> {
        view::pinned_links(&store.snapshot())
            .into_iter()
            .map(|l| (l.id.clone(), l.pinned_order))
            .collect()
    }

    #[test]
    fn test_open_empty_store() {
        let (store, handle) = memory_store();
        assert!(store.links().is_empty());
        assert_eq!(store.categories().len(), 1);
        assert_eq!(store.categories()[0].id, COMMON_CATEGORY_ID);
        assert!(store.persistence_health().is_healthy());
        assert_eq!(handle.writes(), 0);
    }

    #[test]
    fn test_add_link_assigns_id_and_increasing_order() {
        let (mut store, handle) = memory_store();

        let mut orders = Vec::new();
        let mut ids = HashSet::new();
        for i in 0..5 {
            let link = store
                .add_link(LinkDraft::new(format!("Site {}", i), format!("https://{}.com", i), "common"))
                .unwrap();
            assert!(ids.insert(link.id.clone()));
            orders.push(link.order.unwrap());
        }

        assert!(orders.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(orders[0], 0);
        assert_eq!(handle.writes(), 5);
        assert_eq!(handle.stored().unwrap().links.len(), 5);
    }

    #[test]
    fn test_add_link_sorts_last_after_timestamp_orders() {
        let (mut store, _) = memory_store();
        let mut legacy = link_with("old", "common", None);
        legacy.created_at = 1_700_000_000_000;
        store.update_data(vec![legacy], vec![Category::common()]).unwrap();

        let added = store
            .add_link(LinkDraft::new("New", "https://new.com", "common"))
            .unwrap();

        assert_eq!(display_ids(&store, "all"), vec!["old".to_string(), added.id]);
    }

    #[test]
    fn test_add_link_after_max_order_renumbers() {
        let (mut store, _) = work_store();
        let mut update = LinkUpdate::from_link(store.get_link("1").unwrap());
        update.order = Some(i64::MAX);
        store.update_link(update).unwrap();

        let added = store
            .add_link(LinkDraft::new("New", "https://new.com", "work"))
            .unwrap();

        assert_eq!(added.order, Some(3));
        assert_eq!(store.get_link("2").unwrap().order, Some(0));
        assert_eq!(store.get_link("1").unwrap().order, Some(2));
        assert_eq!(
            display_ids(&store, "work"),
            vec!["2".to_string(), "3".to_string(), "1".to_string(), added.id]
        );
    }

    #[test]
    fn test_import_after_max_order_renumbers() {
        let (mut store, _) = memory_store();
        store
            .update_data(
                vec![
                    link_with("1", "common", Some(i64::MAX - 1)),
                    link_with("2", "common", Some(0)),
                ],
                vec![Category::common()],
            )
            .unwrap();

        let added = store
            .import_data(
                vec![
                    link_with("3", "common", None),
                    link_with("4", "common", None),
                ],
                Vec::new(),
            )
            .unwrap();

        assert_eq!(added, 2);
        assert_eq!(display_ids(&store, "all"), vec!["2", "1", "3", "4"]);
        assert_eq!(store.get_link("4").unwrap().order, Some(3));
    }

    #[test]
    fn test_add_link_validation() {
        let (mut store, handle) = memory_store();
        let before = store.snapshot();

        let err = store
            .add_link(LinkDraft::new("  ", "https://a.com", "common"))
            .unwrap_err();
        assert!(err.is_validation());

        let err = store.add_link(LinkDraft::new("A", "", "common")).unwrap_err();
        assert!(err.is_validation());

        let err = store
            .add_link(LinkDraft::new("A", "https://a.com", "missing"))
            .unwrap_err();
        assert!(err.is_validation());

        let err = store
            .add_link(LinkDraft::new("A", "https://a.com", ALL_CATEGORY_ID))
            .unwrap_err();
        assert!(err.is_validation());

        assert_eq!(*store.snapshot(), *before);
        assert_eq!(handle.writes(), 0);
    }

    #[test]
    fn test_add_link_trims_and_drops_blank_optionals() {
        let (mut store, _) = memory_store();
        let link = store
            .add_link(
                LinkDraft::new(" Title ", " https://a.com ", "common")
                    .with_description("   ")
                    .with_icon("Globe"),
            )
            .unwrap();

        assert_eq!(link.title, "Title");
        assert_eq!(link.url, "https://a.com");
        assert!(link.description.is_none());
        assert_eq!(link.icon.as_deref(), Some("Globe"));
    }

    #[test]
    fn test_update_link() {
        let (mut store, _) = work_store();

        let mut update = LinkUpdate::from_link(store.get_link("2").unwrap());
        update.draft.title = "Renamed".to_string();
        update.draft.category_id = COMMON_CATEGORY_ID.to_string();
        let updated = store.update_link(update).unwrap();

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.category_id, COMMON_CATEGORY_ID);
        assert_eq!(updated.order, Some(1));
        assert_eq!(store.get_link("2").unwrap().title, "Renamed");
    }

    #[test]
    fn test_update_link_explicit_order() {
        let (mut store, _) = work_store();

        let mut update = LinkUpdate::from_link(store.get_link("1").unwrap());
        update.order = Some(10);
        store.update_link(update).unwrap();

        assert_eq!(display_ids(&store, "work"), vec!["2", "3", "1"]);
    }

    #[test]
    fn test_update_link_not_found() {
        let (mut store, _) = work_store();
        let update = LinkUpdate::new("nope", LinkDraft::new("A", "https://a.com", "work"));
        assert!(store.update_link(update).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_link_pinned_order_requires_pin() {
        let (mut store, _) = work_store();
        let mut update = LinkUpdate::from_link(store.get_link("1").unwrap());
        update.pinned_order = Some(0);
        assert!(store.update_link(update).unwrap_err().is_invalid_operation());
    }

    #[test]
    fn test_update_link_pinned_order_repositions() {
        let (mut store, _) = work_store();
        store.toggle_pin("1").unwrap();
        store.toggle_pin("2").unwrap();
        store.toggle_pin("3").unwrap();

        let mut update = LinkUpdate::from_link(store.get_link("3").unwrap());
        update.pinned_order = Some(0);
        store.update_link(update).unwrap();

        assert_eq!(
            pinned_orders(&store),
            vec![
                ("3".to_string(), Some(0)),
                ("1".to_string(), Some(1)),
                ("2".to_string(), Some(2)),
            ]
        );
    }

    #[test]
    fn test_delete_link() {
        let (mut store, _) = work_store();
        let removed = store.delete_link("2").unwrap();
        assert_eq!(removed.id, "2");
        assert!(store.get_link("2").is_none());
        assert_eq!(store.links().len(), 2);
    }

    #[test]
    fn test_delete_link_not_found_leaves_state() {
        let (mut store, handle) = work_store();
        let writes = handle.writes();
        assert!(store.delete_link("missing").unwrap_err().is_not_found());
        assert_eq!(store.links().len(), 3);
        assert_eq!(handle.writes(), writes);
    }

    #[test]
    fn test_delete_pinned_link_compacts() {
        let (mut store, _) = work_store();
        store.toggle_pin("1").unwrap();
        store.toggle_pin("2").unwrap();
        store.delete_link("1").unwrap();
        assert_eq!(pinned_orders(&store), vec![("2".to_string(), Some(0))]);
    }

    #[test]
    fn test_batch_delete_and_move() {
        let (mut store, _) = work_store();

        let moved = store
            .move_links(&["1".to_string(), "2".to_string()], COMMON_CATEGORY_ID)
            .unwrap();
        assert_eq!(moved, 2);
        assert_eq!(display_ids(&store, "work"), vec!["3"]);

        let deleted = store.delete_links(&["1".to_string(), "3".to_string()]).unwrap();
        assert_eq!(deleted, 2);
        assert_eq!(display_ids(&store, "all"), vec!["2"]);
    }

    #[test]
    fn test_batch_rejects_unknown_ids_atomically() {
        let (mut store, _) = work_store();
        let err = store
            .delete_links(&["1".to_string(), "ghost".to_string()])
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.links().len(), 3);

        let err = store.move_links(&["1".to_string()], "nowhere").unwrap_err();
        assert!(err.is_validation());
        assert!(store.delete_links(&[]).unwrap_err().is_validation());
    }

    #[test]
    fn test_pin_then_unpin_compacts() {
        let (mut store, _) = work_store();

        assert!(store.toggle_pin("1").unwrap());
        assert!(store.toggle_pin("2").unwrap());
        assert_eq!(
            pinned_orders(&store),
            vec![("1".to_string(), Some(0)), ("2".to_string(), Some(1))]
        );

        assert!(!store.toggle_pin("1").unwrap());
        assert_eq!(pinned_orders(&store), vec![("2".to_string(), Some(0))]);
        assert_eq!(store.get_link("1").unwrap().pinned_order, None);
    }

    #[test]
    fn test_toggle_pin_twice_restores_link() {
        let (mut store, _) = work_store();
        store.toggle_pin("2").unwrap();
        store.toggle_pin("3").unwrap();
        let before = store.get_link("1").unwrap().clone();

        store.toggle_pin("1").unwrap();
        store.toggle_pin("1").unwrap();

        assert_eq!(*store.get_link("1").unwrap(), before);
        assert_eq!(
            pinned_orders(&store),
            vec![("2".to_string(), Some(0)), ("3".to_string(), Some(1))]
        );
    }

    #[test]
    fn test_toggle_pin_not_found() {
        let (mut store, _) = work_store();
        assert!(store.toggle_pin("missing").unwrap_err().is_not_found());
    }

    #[test]
    fn test_reorder_links_moves_before_target() {
        let (mut store, _) = work_store();

        assert!(store.reorder_links("3", "1", &CategoryScope::parse("work")));

        assert_eq!(display_ids(&store, "work"), vec!["3", "1", "2"]);
        assert_eq!(store.get_link("3").unwrap().order, Some(0));
        assert_eq!(store.get_link("1").unwrap().order, Some(1));
        assert_eq!(store.get_link("2").unwrap().order, Some(2));
    }

    #[test]
    fn test_reorder_links_reverse_restores_pair() {
        let (mut store, _) = work_store();
        let scope = CategoryScope::parse("work");

        store.reorder_links("3", "1", &scope);
        store.reorder_links("1", "3", &scope);

        let ids = display_ids(&store, "work");
        let pos = |id: &str| ids.iter().position(|x| x == id).unwrap();
        assert!(pos("1") < pos("3"));
    }

    #[test]
    fn test_reorder_links_noop_cases() {
        let (mut store, handle) = work_store();
        let writes = handle.writes();
        let rx = store.subscribe();
        let scope = CategoryScope::parse("work");

        assert!(!store.reorder_links("1", "1", &scope));
        assert!(!store.reorder_links("1", "missing", &scope));
        assert!(!store.reorder_links("1", "2", &CategoryScope::parse(COMMON_CATEGORY_ID)));

        assert_eq!(handle.writes(), writes);
        assert!(!rx.has_changed().unwrap());
        assert_eq!(display_ids(&store, "work"), vec!["1", "2", "3"]);
    }

    #[test]
    fn test_reorder_links_only_renumbers_scope() {
        let (mut store, _) = work_store();
        store
            .add_link(LinkDraft::new("Other", "https://other.com", COMMON_CATEGORY_ID))
            .unwrap();
        let other_order = store
            .links()
            .iter()
            .find(|l| l.category_id == COMMON_CATEGORY_ID)
            .unwrap()
            .order;

        store.reorder_links("1", "3", &CategoryScope::parse("work"));

        assert_eq!(display_ids(&store, "work"), vec!["2", "3", "1"]);
        let after = store
            .links()
            .iter()
            .find(|l| l.category_id == COMMON_CATEGORY_ID)
            .unwrap()
            .order;
        assert_eq!(after, other_order);
    }

    #[test]
    fn test_reorder_links_in_filtered_view() {
        let (mut store, _) = work_store();
        let mut update = LinkUpdate::from_link(store.get_link("2").unwrap());
        update.draft.title = "Hidden".to_string();
        store.update_link(update).unwrap();

        let filter = ViewFilter::category("work").with_query("link");
        assert!(store.reorder_links_in_view("3", "1", &filter));

        assert_eq!(store.get_link("3").unwrap().order, Some(0));
        assert_eq!(store.get_link("1").unwrap().order, Some(1));
        // hidden link untouched
        assert_eq!(store.get_link("2").unwrap().order, Some(1));
        // hidden link is outside the view, so it cannot be a drop target
        assert!(!store.reorder_links_in_view("3", "2", &filter));
    }

    #[test]
    fn test_reorder_pinned_links() {
        let (mut store, _) = work_store();
        store.toggle_pin("1").unwrap();
        store.toggle_pin("2").unwrap();
        store.toggle_pin("3").unwrap();

        assert!(store.reorder_pinned_links("3", "1"));
        assert_eq!(
            pinned_orders(&store),
            vec![
                ("3".to_string(), Some(0)),
                ("1".to_string(), Some(1)),
                ("2".to_string(), Some(2)),
            ]
        );
        // category order untouched
        assert_eq!(display_ids(&store, "work"), vec!["1", "2", "3"]);
        assert!(!store.reorder_pinned_links("3", "3"));
    }

    #[test]
    fn test_reorder_pinned_ignores_unpinned() {
        let (mut store, _) = work_store();
        store.toggle_pin("1").unwrap();
        assert!(!store.reorder_pinned_links("1", "2"));
    }

    #[test]
    fn test_category_lifecycle() {
        let (mut store, _) = memory_store();

        let dev = store.add_category(" Dev ", Some("Code".into())).unwrap();
        assert_eq!(dev.name, "Dev");
        let news = store.add_category("News", None).unwrap();

        let renamed = store.update_category(&dev.id, "Development", None).unwrap();
        assert_eq!(renamed.name, "Development");
        assert!(renamed.icon.is_none());

        assert!(store.reorder_categories(&news.id, COMMON_CATEGORY_ID));
        let ids: Vec<&str> = store.categories().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec![news.id.as_str(), COMMON_CATEGORY_ID, dev.id.as_str()]);

        assert!(store.add_category("   ", None).unwrap_err().is_validation());
        assert!(store
            .update_category("missing", "X", None)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete_category_moves_links_to_fallback() {
        let (mut store, _) = work_store();

        let moved = store.delete_category("work").unwrap();

        assert_eq!(moved, 3);
        assert!(store.get_category("work").is_none());
        for id in ["1", "2", "3"] {
            assert_eq!(store.get_link(id).unwrap().category_id, COMMON_CATEGORY_ID);
        }
    }

    #[test]
    fn test_delete_reserved_category_rejected() {
        let (mut store, _) = work_store();
        assert!(store
            .delete_category(COMMON_CATEGORY_ID)
            .unwrap_err()
            .is_invalid_operation());
        assert!(store
            .delete_category(ALL_CATEGORY_ID)
            .unwrap_err()
            .is_invalid_operation());
        assert!(store.delete_category("ghost").unwrap_err().is_not_found());
    }

    #[test]
    fn test_import_skips_duplicates() {
        let (mut store, _) = work_store();
        store.toggle_pin("1").unwrap();

        let duplicate = link_with("1", "work", Some(99));
        let fresh = link_with("4", "work", None);
        let added = store.import_data(vec![duplicate, fresh], Vec::new()).unwrap();

        assert_eq!(added, 1);
        assert_eq!(store.links().len(), 4);
        let untouched = store.get_link("1").unwrap();
        assert!(untouched.pinned);
        assert_eq!(untouched.order, Some(0));
        assert_eq!(untouched.pinned_order, Some(0));
        assert_eq!(display_ids(&store, "work").last().unwrap(), "4");
    }

    #[test]
    fn test_import_of_known_links_does_not_publish() {
        let (mut store, handle) = work_store();
        let writes = handle.writes();
        let rx = store.subscribe();

        let added = store
            .import_data(
                vec![link_with("2", "work", None)],
                vec![Category::new("work", "Work")],
            )
            .unwrap();

        assert_eq!(added, 0);
        assert_eq!(handle.writes(), writes);
        assert!(!rx.has_changed().unwrap());

        store
            .import_data(Vec::new(), vec![Category::new("work", "Office")])
            .unwrap();
        assert_eq!(handle.writes(), writes + 1);
        assert!(rx.has_changed().unwrap());
    }

    #[test]
    fn test_import_skips_url_duplicates_and_blank_entries() {
        let (mut store, _) = work_store();

        let same_url = LinkItem::with_id("x", "Again", " https://1.example ", "work");
        let blank = LinkItem::with_id("y", "", "https://y.com", "work");
        let twin_a = LinkItem::with_id("", "Twin", "https://twin.com", "work");
        let twin_b = LinkItem::with_id("", "Twin", "https://twin.com", "work");

        let added = store
            .import_data(vec![same_url, blank, twin_a, twin_b], Vec::new())
            .unwrap();

        assert_eq!(added, 1);
        let twin = store.links().iter().find(|l| l.url == "https://twin.com").unwrap();
        assert!(!twin.id.is_empty());
    }

    #[test]
    fn test_import_merges_categories_and_maps_unknown() {
        let (mut store, _) = work_store();

        let categories = vec![Category::new("work", "Office"), Category::new("fun", "Fun")];
        let links = vec![
            link_with("a", "fun", None),
            link_with("b", "elsewhere", None),
        ];
        store.import_data(links, categories).unwrap();

        assert_eq!(store.get_category("work").unwrap().name, "Office");
        assert!(store.get_category("fun").is_some());
        assert_eq!(store.get_link("a").unwrap().category_id, "fun");
        assert_eq!(store.get_link("b").unwrap().category_id, COMMON_CATEGORY_ID);
    }

    #[test]
    fn test_import_appends_pinned() {
        let (mut store, _) = work_store();
        store.toggle_pin("2").unwrap();

        let mut incoming = link_with("p", "work", None);
        incoming.pinned = true;
        incoming.pinned_order = Some(0);
        store.import_data(vec![incoming], Vec::new()).unwrap();

        assert_eq!(
            pinned_orders(&store),
            vec![("2".to_string(), Some(0)), ("p".to_string(), Some(1))]
        );
    }

    #[test]
    fn test_import_rejects_all_category() {
        let (mut store, _) = work_store();
        let err = store
            .import_data(Vec::new(), vec![Category::new(ALL_CATEGORY_ID, "All")])
            .unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn test_update_data_validates() {
        let (mut store, _) = work_store();
        let before = store.snapshot();

        let err = store
            .update_data(
                vec![link_with("1", "work", None), link_with("1", "work", None)],
                vec![Category::new("work", "Work")],
            )
            .unwrap_err();
        assert!(err.is_validation());

        let err = store
            .update_data(vec![link_with("1", "gone", None)], Vec::new())
            .unwrap_err();
        assert!(err.is_validation());

        let err = store
            .update_data(Vec::new(), vec![Category::new(ALL_CATEGORY_ID, "All")])
            .unwrap_err();
        assert!(err.is_invalid_operation());

        assert_eq!(*store.snapshot(), *before);
    }

    #[test]
    fn test_update_data_normalizes_pins_and_fallback() {
        let (mut store, _) = memory_store();
        let mut a = link_with("a", COMMON_CATEGORY_ID, None);
        a.pinned = true;
        a.pinned_order = Some(3);
        let mut b = link_with("b", COMMON_CATEGORY_ID, None);
        b.pinned_order = Some(1);

        store.update_data(vec![a, b], Vec::new()).unwrap();

        assert!(store.get_category(COMMON_CATEGORY_ID).is_some());
        assert_eq!(store.get_link("a").unwrap().pinned_order, Some(0));
        assert_eq!(store.get_link("b").unwrap().pinned_order, None);
    }

    #[test]
    fn test_subscribers_see_each_commit() {
        let (mut store, _) = memory_store();
        let mut rx = store.subscribe();

        store
            .add_link(LinkDraft::new("A", "https://a.com", COMMON_CATEGORY_ID))
            .unwrap();

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.links.len(), 1);
        assert_eq!(*seen, *store.snapshot());

        let _ = store.add_link(LinkDraft::new("", "https://b.com", COMMON_CATEGORY_ID));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_persistence_failure_keeps_memory_state() {
        let (mut store, handle) = memory_store();
        handle.set_fail_writes(true);

        store
            .add_link(LinkDraft::new("A", "https://a.com", COMMON_CATEGORY_ID))
            .unwrap();

        assert_eq!(store.links().len(), 1);
        match store.persistence_health() {
            PersistenceHealth::Degraded { reason, hint } => {
                assert!(reason.contains("quota exceeded"));
                assert!(hint.is_some());
            }
            PersistenceHealth::Healthy => panic!("write failure not reported"),
        }
        assert!(handle.stored().is_none());

        handle.set_fail_writes(false);
        store
            .add_link(LinkDraft::new("B", "https://b.com", COMMON_CATEGORY_ID))
            .unwrap();
        assert!(store.persistence_health().is_healthy());
        assert_eq!(handle.stored().unwrap().links.len(), 2);
    }

    #[test]
    fn test_open_repairs_stored_snapshot() {
        let mut pinned = link_with("a", "gone", None);
        pinned.pinned = true;
        pinned.pinned_order = Some(5);
        let duplicate = link_with("a", COMMON_CATEGORY_ID, None);
        let stored = Snapshot::new(
            vec![pinned, duplicate],
            vec![Category::new(ALL_CATEGORY_ID, "All"), Category::new("work", "Work")],
        );

        let store = BookmarkStore::open_with(MemoryPersistence::with_snapshot(stored));

        assert_eq!(store.links().len(), 1);
        let link = store.get_link("a").unwrap();
        assert_eq!(link.category_id, COMMON_CATEGORY_ID);
        assert_eq!(link.pinned_order, Some(0));
        assert!(store.get_category(ALL_CATEGORY_ID).is_none());
        assert!(store.get_category(COMMON_CATEGORY_ID).is_some());
    }

    #[test]
    fn test_file_store_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };

        let id = {
            let mut store = BookmarkStore::open(&config);
            let link = store
                .add_link(LinkDraft::new("Persist", "https://persist.com", COMMON_CATEGORY_ID))
                .unwrap();
            store.toggle_pin(&link.id).unwrap();
            link.id
        };

        let store = BookmarkStore::open(&config);
        let link = store.get_link(&id).unwrap();
        assert_eq!(link.title, "Persist");
        assert!(link.pinned);
        assert!(config.store_path().exists());
    }

    #[test]
    fn test_corrupt_file_falls_back_to_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            ..Config::default()
        };
        std::fs::write(config.store_path(), "not json at all").unwrap();

        let store = BookmarkStore::open(&config);

        assert!(store.links().is_empty());
        assert_eq!(*store.snapshot(), Snapshot::default());
        assert!(JsonFilePersistence::new(&config).corrupt_backup_path().exists());
    }
}
