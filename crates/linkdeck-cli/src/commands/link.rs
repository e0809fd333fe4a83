//! Link command handlers

use anyhow::{Context, Result};

use linkdeck_core::view::{self, CategoryScope, ViewFilter};
use linkdeck_core::{BookmarkStore, LinkDraft, LinkUpdate};

use super::{parse_category, parse_link_id, parse_link_ids};
use crate::metadata::fetch_metadata;
use crate::output::{short_id, Output};
use crate::prompt::{confirm, is_interactive, prompt_with_default};

/// Fields supplied on the command line for `link add`
pub struct AddArgs {
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: String,
    pub fetch: bool,
}

/// Fields supplied on the command line for `link edit`
#[derive(Default)]
pub struct EditArgs {
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub category: Option<String>,
    pub order: Option<i64>,
    pub pinned_position: Option<i64>,
}

impl EditArgs {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.description.is_none()
            && self.icon.is_none()
            && self.category.is_none()
            && self.order.is_none()
            && self.pinned_position.is_none()
    }
}

/// Add a new link
pub async fn add(store: &mut BookmarkStore, args: AddArgs, output: &Output) -> Result<()> {
    let snapshot = store.snapshot();
    let category = parse_category(&args.category, &snapshot)?;

    let mut title = args.title;
    let mut description = args.description;
    if args.fetch && (title.is_none() || description.is_none()) {
        let metadata = fetch_metadata(&args.url).await;
        title = title.or(metadata.title);
        description = description.or(metadata.description);
    }

    let mut draft = LinkDraft::new(title.unwrap_or_else(|| args.url.clone()), &args.url, category);
    draft.description = description;
    draft.icon = args.icon;

    let link = store.add_link(draft).context("Failed to add link")?;

    output.success(&format!("Added link: {}", link.id));
    output.print_link(&link, &store.snapshot());
    Ok(())
}

/// List links in display order
pub fn list(
    store: &BookmarkStore,
    category: &str,
    query: Option<String>,
    output: &Output,
) -> Result<()> {
    let snapshot = store.snapshot();
    let filter = view_filter(category, query, &snapshot)?;
    let links = view::display_links(&snapshot, &filter);
    output.print_links(&links, &snapshot);
    Ok(())
}

/// Show a single link
pub fn show(store: &BookmarkStore, id: &str, output: &Output) -> Result<()> {
    let snapshot = store.snapshot();
    let id = parse_link_id(id, &snapshot)?;
    let link = snapshot
        .link(&id)
        .ok_or_else(|| anyhow::anyhow!("Link not found: {}", id))?;

    output.print_link(link, &snapshot);
    Ok(())
}

/// Edit a link
///
/// With no field flags and an interactive terminal, prompts for each field.
pub fn edit(store: &mut BookmarkStore, id: &str, args: EditArgs, output: &Output) -> Result<()> {
    let snapshot = store.snapshot();
    let id = parse_link_id(id, &snapshot)?;
    let link = snapshot
        .link(&id)
        .ok_or_else(|| anyhow::anyhow!("Link not found: {}", id))?;

    let mut update = LinkUpdate::from_link(link);

    if args.is_empty() && is_interactive() && output.should_prompt() {
        println!("Editing link: {}", link.id);
        println!("Press Enter to keep current value, or type new value.\n");

        if let Some(title) = prompt_with_default("Title", &link.title)? {
            update.draft.title = title;
        }
        if let Some(url) = prompt_with_default("URL", &link.url)? {
            update.draft.url = url;
        }
        let current_desc = link.description.as_deref().unwrap_or("");
        if let Some(desc) = prompt_with_default("Description (\"-\" clears)", current_desc)? {
            update.draft.description = if desc == "-" { None } else { Some(desc) };
        }
        if let Some(category) = prompt_with_default("Category", &link.category_id)? {
            update.draft.category_id = parse_category(&category, &snapshot)?;
        }
    } else {
        if let Some(title) = args.title {
            update.draft.title = title;
        }
        if let Some(url) = args.url {
            update.draft.url = url;
        }
        if let Some(desc) = args.description {
            update.draft.description = Some(desc);
        }
        if let Some(icon) = args.icon {
            update.draft.icon = Some(icon);
        }
        if let Some(category) = args.category {
            update.draft.category_id = parse_category(&category, &snapshot)?;
        }
        update.order = args.order;
        // positions are 1-based on the command line
        update.pinned_order = args.pinned_position.map(pinned_index);
    }

    let updated = store.update_link(update).context("Failed to update link")?;

    output.success("Link updated");
    output.print_link(&updated, &store.snapshot());
    Ok(())
}

/// Delete one or more links
pub fn delete(store: &mut BookmarkStore, ids: &[String], yes: bool, output: &Output) -> Result<()> {
    let snapshot = store.snapshot();
    let ids = parse_link_ids(ids, &snapshot)?;

    if !yes && output.should_prompt() {
        for id in &ids {
            if let Some(link) = snapshot.link(id) {
                println!("Delete link: {} - {}", short_id(&link.id), link.title);
            }
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if let [id] = ids.as_slice() {
        store.delete_link(id).context("Failed to delete link")?;
        output.success(&format!("Deleted link: {}", id));
    } else {
        let count = store.delete_links(&ids).context("Failed to delete links")?;
        output.success(&format!("Deleted {} links", count));
    }
    Ok(())
}

/// Move links to another category
pub fn move_to(
    store: &mut BookmarkStore,
    ids: &[String],
    category: &str,
    output: &Output,
) -> Result<()> {
    let snapshot = store.snapshot();
    let ids = parse_link_ids(ids, &snapshot)?;
    let category = parse_category(category, &snapshot)?;

    let count = store
        .move_links(&ids, &category)
        .context("Failed to move links")?;

    let name = store
        .get_category(&category)
        .map(|c| c.name.clone())
        .unwrap_or(category);
    output.success(&format!("Moved {} link(s) to {}", count, name));
    Ok(())
}

/// Toggle a link's pinned state
pub fn pin(store: &mut BookmarkStore, id: &str, output: &Output) -> Result<()> {
    let id = parse_link_id(id, &store.snapshot())?;
    let pinned = store.toggle_pin(&id).context("Failed to toggle pin")?;

    if pinned {
        output.success(&format!("Pinned link: {}", id));
    } else {
        output.success(&format!("Unpinned link: {}", id));
    }
    Ok(())
}

/// Move a link to the position held by another within a view
pub fn reorder(
    store: &mut BookmarkStore,
    moved: &str,
    target: &str,
    category: &str,
    query: Option<String>,
    output: &Output,
) -> Result<()> {
    let snapshot = store.snapshot();
    let moved = parse_link_id(moved, &snapshot)?;
    let target = parse_link_id(target, &snapshot)?;
    let filter = view_filter(category, query, &snapshot)?;

    if store.reorder_links_in_view(&moved, &target, &filter) {
        output.success("Links reordered");
    } else {
        output.message("Nothing to reorder: both links must be distinct and visible in the view.");
    }
    Ok(())
}

/// Search links across every category
pub fn search(store: &BookmarkStore, query: &str, output: &Output) -> Result<()> {
    let snapshot = store.snapshot();
    let links = view::search_links(&snapshot, query);
    output.print_links(&links, &snapshot);
    Ok(())
}

fn view_filter(
    category: &str,
    query: Option<String>,
    snapshot: &linkdeck_core::Snapshot,
) -> Result<ViewFilter> {
    let scope = CategoryScope::parse(&parse_category(category, snapshot)?);
    let filter = ViewFilter::all().with_scope(scope);
    Ok(match query {
        Some(q) => filter.with_query(q),
        None => filter,
    })
}

/// 1-based pinned position from the command line to a 0-based index
fn pinned_index(position: i64) -> i64 {
    position.saturating_sub(1).max(0)
}
