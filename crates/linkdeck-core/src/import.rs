//! Bookmark import
//!
//! Browsers export bookmarks as Netscape bookmark HTML: nested `<DL>` lists
//! where a `<DT><H3>` starts a folder and a `<DT><A HREF>` is a bookmark,
//! optionally followed by a `<DD>` description. Parsing yields
//! [`BookmarkCandidate`]s; an [`ImportPlan`] maps them onto categories and
//! produces the input for [`BookmarkStore::import_data`].
//!
//! [`BookmarkStore::import_data`]: crate::store::BookmarkStore::import_data

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::backup::{BackupBundle, BackupResult};
use crate::models::{new_id, Category, LinkItem, Snapshot, COMMON_CATEGORY_ID};

/// A bookmark found in an import file, before it becomes a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkCandidate {
    pub title: String,
    pub url: String,
    /// Innermost enclosing folder name
    pub folder: Option<String>,
    pub description: Option<String>,
}

/// Where imported bookmarks land
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    /// Everything into one category
    Category(String),
    /// One category per folder, matched by name; folderless bookmarks go to
    /// `fallback`
    ByFolder { fallback: String },
}

impl Default for ImportTarget {
    fn default() -> Self {
        ImportTarget::Category(COMMON_CATEGORY_ID.to_string())
    }
}

/// Parsed contents of an import file
#[derive(Debug, Clone)]
pub enum ImportDocument {
    Bookmarks(Vec<BookmarkCandidate>),
    Backup(BackupBundle),
}

impl ImportDocument {
    /// JSON documents are read as backups, anything else as bookmark HTML
    pub fn parse(text: &str) -> BackupResult<Self> {
        if text.trim_start().starts_with('{') {
            Ok(ImportDocument::Backup(BackupBundle::parse(text)?))
        } else {
            Ok(ImportDocument::Bookmarks(parse_netscape_html(text)))
        }
    }
}

/// Extract bookmarks from Netscape bookmark HTML
///
/// Entries without an href, and browser-internal `place:`/`javascript:`
/// entries, are skipped. An empty title falls back to the URL.
pub fn parse_netscape_html(html: &str) -> Vec<BookmarkCandidate> {
    let document = Html::parse_document(html);
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let mut candidates = Vec::new();
    for anchor in document.select(&anchors) {
        let url = anchor.value().attr("href").unwrap_or_default().trim();
        if url.is_empty() || is_internal_url(url) {
            continue;
        }

        let title = collapse_whitespace(&anchor.text().collect::<String>());
        let title = if title.is_empty() { url.to_string() } else { title };

        candidates.push(BookmarkCandidate {
            title,
            url: url.to_string(),
            folder: folder_of(anchor),
            description: description_of(anchor),
        });
    }

    debug!("Parsed {} bookmarks from HTML", candidates.len());
    candidates
}

fn is_internal_url(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("place:") || lower.starts_with("javascript:")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn first_child_named<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find(|child| child.value().name() == name)
}

fn heading_text(dt: ElementRef<'_>) -> Option<String> {
    first_child_named(dt, "h3")
        .map(|h3| collapse_whitespace(&h3.text().collect::<String>()))
        .filter(|name| !name.is_empty())
}

/// Name of the innermost folder containing `anchor`
fn folder_of(anchor: ElementRef<'_>) -> Option<String> {
    for node in anchor.ancestors() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        match element.value().name() {
            "dt" => {
                if let Some(name) = heading_text(element) {
                    return Some(name);
                }
            }
            // a folder description swallows the folder's list
            "dd" => {
                let heading = element
                    .prev_siblings()
                    .filter_map(ElementRef::wrap)
                    .next()
                    .filter(|prev| prev.value().name() == "dt")
                    .and_then(heading_text);
                if heading.is_some() {
                    return heading;
                }
            }
            _ => {}
        }
    }
    None
}

/// `<DD>` text directly following the bookmark's `<DT>`
fn description_of(anchor: ElementRef<'_>) -> Option<String> {
    let dt = anchor
        .parent()
        .and_then(ElementRef::wrap)
        .filter(|parent| parent.value().name() == "dt")?;
    let dd = dt
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .next()
        .filter(|next| next.value().name() == "dd")?;

    dd.text()
        .next()
        .map(collapse_whitespace)
        .filter(|text| !text.is_empty())
}

/// Links and new categories ready for `import_data`
#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    pub links: Vec<LinkItem>,
    /// Categories to create; existing ones are referenced, not repeated
    pub categories: Vec<Category>,
}

impl ImportPlan {
    /// Map candidates onto categories of `existing`
    ///
    /// Folder names match existing category names case-insensitively;
    /// unmatched folders become new categories.
    pub fn build(
        candidates: Vec<BookmarkCandidate>,
        target: &ImportTarget,
        existing: &Snapshot,
    ) -> Self {
        let mut plan = ImportPlan::default();

        for candidate in candidates {
            let category_id = match target {
                ImportTarget::Category(id) => id.clone(),
                ImportTarget::ByFolder { fallback } => match &candidate.folder {
                    Some(folder) => plan.category_for_folder(folder, existing),
                    None => fallback.clone(),
                },
            };

            let mut link = LinkItem::new(candidate.title, candidate.url, category_id);
            link.description = candidate.description;
            plan.links.push(link);
        }

        plan
    }

    fn category_for_folder(&mut self, folder: &str, existing: &Snapshot) -> String {
        let wanted = folder.to_lowercase();
        let found = existing
            .categories
            .iter()
            .chain(self.categories.iter())
            .find(|c| c.name.to_lowercase() == wanted)
            .map(|c| c.id.clone());

        found.unwrap_or_else(|| {
            let category = Category::new(new_id(), folder);
            let id = category.id.clone();
            self.categories.push(category);
            id
        })
    }
}
