//! Command handlers

pub mod backup;
pub mod category;
pub mod config;
pub mod import;
pub mod link;
pub mod pinned;
pub mod remote;
pub mod status;

use anyhow::{bail, Result};

use linkdeck_core::{Snapshot, ALL_CATEGORY_ID};

/// Resolve a link ID (supports full ID or prefix)
pub fn parse_link_id(id: &str, snapshot: &Snapshot) -> Result<String> {
    if snapshot.link(id).is_some() {
        return Ok(id.to_string());
    }

    let matches: Vec<_> = snapshot
        .links
        .iter()
        .filter(|l| l.id.starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No link found matching: {}", id),
        1 => Ok(matches[0].id.clone()),
        _ => {
            eprintln!("Multiple links match '{}':", id);
            for link in &matches {
                eprintln!("  {} - {}", link.id, link.title);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// Resolve several link IDs, failing on the first that does not match
pub fn parse_link_ids(ids: &[String], snapshot: &Snapshot) -> Result<Vec<String>> {
    ids.iter().map(|id| parse_link_id(id, snapshot)).collect()
}

/// Resolve a category by ID, name (case-insensitive) or ID prefix
///
/// `all` passes through untouched so it can be used as a view scope.
pub fn parse_category(key: &str, snapshot: &Snapshot) -> Result<String> {
    if key == ALL_CATEGORY_ID || snapshot.category(key).is_some() {
        return Ok(key.to_string());
    }

    let wanted = key.to_lowercase();
    if let Some(category) = snapshot
        .categories
        .iter()
        .find(|c| c.name.to_lowercase() == wanted)
    {
        return Ok(category.id.clone());
    }

    let matches: Vec<_> = snapshot
        .categories
        .iter()
        .filter(|c| c.id.starts_with(key))
        .collect();

    match matches.len() {
        1 => Ok(matches[0].id.clone()),
        0 => bail!("No category found matching: {}", key),
        _ => bail!("Ambiguous category '{}'. Use the full ID or name.", key),
    }
}
