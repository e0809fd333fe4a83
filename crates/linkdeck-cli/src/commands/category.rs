//! Category command handlers

use anyhow::{Context, Result};

use linkdeck_core::view;
use linkdeck_core::BookmarkStore;

use super::parse_category;
use crate::output::Output;
use crate::prompt::confirm;

/// List categories with link counts
pub fn list(store: &BookmarkStore, output: &Output) -> Result<()> {
    let snapshot = store.snapshot();
    let counts = view::category_counts(&snapshot);
    let rows: Vec<_> = snapshot
        .categories
        .iter()
        .zip(counts.iter().map(|(_, count)| *count))
        .collect();

    output.print_categories(&rows);
    Ok(())
}

pub fn add(store: &mut BookmarkStore, name: &str, icon: Option<String>, output: &Output) -> Result<()> {
    let category = store
        .add_category(name, icon)
        .context("Failed to add category")?;

    output.success(&format!("Added category: {} ({})", category.name, category.id));
    if output.is_quiet() {
        println!("{}", category.id);
    }
    Ok(())
}

/// Rename a category, optionally changing its icon
pub fn rename(
    store: &mut BookmarkStore,
    key: &str,
    name: &str,
    icon: Option<String>,
    output: &Output,
) -> Result<()> {
    let id = parse_category(key, &store.snapshot())?;
    let icon = icon.or_else(|| store.get_category(&id).and_then(|c| c.icon.clone()));

    let category = store
        .update_category(&id, name, icon)
        .context("Failed to rename category")?;

    output.success(&format!("Renamed category {} to {}", category.id, category.name));
    Ok(())
}

/// Delete a category; its links move to the fallback category
pub fn delete(store: &mut BookmarkStore, key: &str, yes: bool, output: &Output) -> Result<()> {
    let snapshot = store.snapshot();
    let id = parse_category(key, &snapshot)?;

    if !yes && output.should_prompt() {
        if let Some(category) = snapshot.category(&id) {
            let count = snapshot.links.iter().filter(|l| l.category_id == id).count();
            println!(
                "Delete category: {} ({} link(s) will move to Common)",
                category.name, count
            );
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let moved = store
        .delete_category(&id)
        .context("Failed to delete category")?;

    output.success(&format!(
        "Deleted category {}; moved {} link(s) to Common",
        id, moved
    ));
    Ok(())
}

/// Move a category to the position held by another
pub fn reorder(store: &mut BookmarkStore, moved: &str, target: &str, output: &Output) -> Result<()> {
    let snapshot = store.snapshot();
    let moved = parse_category(moved, &snapshot)?;
    let target = parse_category(target, &snapshot)?;

    if store.reorder_categories(&moved, &target) {
        output.success("Categories reordered");
    } else {
        output.message("Nothing to reorder: choose two different categories.");
    }
    Ok(())
}
