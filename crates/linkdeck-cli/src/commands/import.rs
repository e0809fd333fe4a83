//! Import command handler

use std::path::Path;

use anyhow::{Context, Result};

use linkdeck_core::{BookmarkStore, ImportDocument, ImportPlan, ImportTarget, RestoreMode};

use super::parse_category;
use crate::output::Output;

/// Import a browser bookmark export or a backup file
///
/// Bookmark HTML goes into `category`, or one category per folder with
/// `by_folder`. Backup files are merged.
pub fn import(
    store: &mut BookmarkStore,
    path: &Path,
    category: &str,
    by_folder: bool,
    output: &Output,
) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {:?}", path))?;
    let document = ImportDocument::parse(&text)
        .with_context(|| format!("Failed to parse import file: {:?}", path))?;

    let added = match document {
        ImportDocument::Backup(bundle) => bundle
            .restore_into(store, RestoreMode::Merge)
            .context("Failed to import backup")?,
        ImportDocument::Bookmarks(candidates) => {
            let snapshot = store.snapshot();
            let fallback = parse_category(category, &snapshot)?;
            let target = if by_folder {
                ImportTarget::ByFolder { fallback }
            } else {
                ImportTarget::Category(fallback)
            };

            let found = candidates.len();
            let plan = ImportPlan::build(candidates, &target, &snapshot);
            let added = store
                .import_data(plan.links, plan.categories)
                .context("Failed to import bookmarks")?;
            if added < found && !output.is_quiet() {
                output.message(&format!("Skipped {} duplicate bookmark(s)", found - added));
            }
            added
        }
    };

    output.success(&format!("Imported {} link(s)", added));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use linkdeck_core::MemoryPersistence;
    use tempfile::TempDir;

    const HTML: &str = r#"<!DOCTYPE NETSCAPE-Bookmark-file-1>
<DL><p>
    <DT><H3>News</H3>
    <DL><p>
        <DT><A HREF="https://news.example">News Site</A>
    </DL><p>
    <DT><A HREF="https://loose.example">Loose</A>
</DL><p>
"#;

    #[test]
    fn test_import_html_by_folder() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bookmarks.html");
        std::fs::write(&path, HTML).unwrap();

        let mut store = BookmarkStore::open_with(MemoryPersistence::new());
        let output = Output::new(OutputFormat::Quiet);

        import(&mut store, &path, "common", true, &output).unwrap();
        assert_eq!(store.links().len(), 2);
        assert!(store.categories().iter().any(|c| c.name == "News"));

        // same file again adds nothing
        import(&mut store, &path, "common", true, &output).unwrap();
        assert_eq!(store.links().len(), 2);
    }

    #[test]
    fn test_import_missing_file() {
        let mut store = BookmarkStore::open_with(MemoryPersistence::new());
        let output = Output::new(OutputFormat::Quiet);
        assert!(import(&mut store, Path::new("/nonexistent.html"), "common", false, &output).is_err());
    }
}
