//! Ordering rules shared by the store and the read views
//!
//! Display order is ascending effective order (`order`, else `created_at`)
//! with `id` as the final tie-break. Pinned order is ascending `pinned_order`.
//! Drag-and-drop reduces to [`move_item`], an "insert at drop index" move.

use std::cmp::Ordering;

use crate::models::LinkItem;

/// Total display order for links
pub fn display_cmp(a: &LinkItem, b: &LinkItem) -> Ordering {
    a.effective_order()
        .cmp(&b.effective_order())
        .then_with(|| a.id.cmp(&b.id))
}

/// Total order for the pinned section
///
/// Links carrying a `pinned_order` come first; the rest fall back to
/// creation time.
pub fn pinned_cmp(a: &LinkItem, b: &LinkItem) -> Ordering {
    let primary = match (a.pinned_order, b.pinned_order) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.created_at.cmp(&b.created_at),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

pub fn sort_for_display(links: &mut [&LinkItem]) {
    links.sort_by(|a, b| display_cmp(a, b));
}

pub fn sort_pinned(links: &mut [&LinkItem]) {
    links.sort_by(|a, b| pinned_cmp(a, b));
}

/// Move `moved` to the index currently held by `target`
///
/// Returns `None` when the ids are equal or either is missing. Dragging
/// down lands after the target, dragging up lands before it.
pub fn move_item<T: AsRef<str>>(ids: &[T], moved: &str, target: &str) -> Option<Vec<String>> {
    if moved == target {
        return None;
    }
    let from = ids.iter().position(|id| id.as_ref() == moved)?;
    let to = ids.iter().position(|id| id.as_ref() == target)?;

    let mut out: Vec<String> = ids.iter().map(|id| id.as_ref().to_string()).collect();
    let item = out.remove(from);
    out.insert(to, item);
    Some(out)
}

/// Ids of the pinned links in pinned display order
pub fn pinned_sequence(links: &[LinkItem]) -> Vec<String> {
    let mut pinned: Vec<&LinkItem> = links.iter().filter(|l| l.pinned).collect();
    sort_pinned(&mut pinned);
    pinned.into_iter().map(|l| l.id.clone()).collect()
}

/// Assign `pinned_order = 0..k-1` following the current pinned order
///
/// Also clears `pinned_order` on every unpinned link.
pub fn compact_pinned(links: &mut [LinkItem]) {
    let sequence = pinned_sequence(links);
    apply_pinned_sequence(links, &sequence);
}

/// Assign `pinned_order` from an explicit id sequence, clearing it elsewhere
pub fn apply_pinned_sequence(links: &mut [LinkItem], sequence: &[String]) {
    for link in links.iter_mut() {
        link.pinned_order = if link.pinned {
            sequence
                .iter()
                .position(|id| *id == link.id)
                .map(|pos| pos as i64)
        } else {
            None
        };
    }
}

/// Assign `order = 0..n-1` to the links named by `sequence`
///
/// Links outside the sequence are left untouched.
pub fn apply_order_sequence(links: &mut [LinkItem], sequence: &[String]) {
    for link in links.iter_mut() {
        if let Some(pos) = sequence.iter().position(|id| *id == link.id) {
            link.order = Some(pos as i64);
        }
    }
}
