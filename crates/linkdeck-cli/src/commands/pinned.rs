//! Pinned section handlers

use anyhow::Result;

use linkdeck_core::view;
use linkdeck_core::BookmarkStore;

use super::parse_link_id;
use crate::output::Output;

/// List pinned links in pinned order
pub fn list(store: &BookmarkStore, output: &Output) -> Result<()> {
    let snapshot = store.snapshot();
    let links = view::pinned_links(&snapshot);
    output.print_links(&links, &snapshot);
    Ok(())
}

/// Move a pinned link to the position held by another pinned link
pub fn reorder(store: &mut BookmarkStore, moved: &str, target: &str, output: &Output) -> Result<()> {
    let snapshot = store.snapshot();
    let moved = parse_link_id(moved, &snapshot)?;
    let target = parse_link_id(target, &snapshot)?;

    if store.reorder_pinned_links(&moved, &target) {
        output.success("Pinned links reordered");
    } else {
        output.message("Nothing to reorder: both links must be distinct and pinned.");
    }
    Ok(())
}
