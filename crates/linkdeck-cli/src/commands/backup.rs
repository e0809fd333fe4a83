//! Backup command handlers

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use linkdeck_core::{BackupBundle, BookmarkStore, Config, RestoreMode};

use crate::output::Output;
use crate::prompt::confirm;

/// Write the current snapshot to a backup file
pub fn export(
    store: &BookmarkStore,
    config: &Config,
    path: &Path,
    include_remote: bool,
    output: &Output,
) -> Result<()> {
    let mut bundle = BackupBundle::from_snapshot(&store.snapshot());
    if include_remote {
        if let Some(remote) = config.remote() {
            bundle = bundle.with_remote_config(&remote)?;
        }
    }

    bundle
        .write_file(path)
        .with_context(|| format!("Failed to write backup: {:?}", path))?;

    output.success(&format!(
        "Exported {} link(s) to {}",
        bundle.links.len(),
        path.display()
    ));
    Ok(())
}

/// Options for `backup restore`
pub struct RestoreArgs {
    pub path: PathBuf,
    pub merge: bool,
    pub with_remote: bool,
    pub yes: bool,
}

/// Restore a backup file, replacing or merging with current data
pub fn restore(
    store: &mut BookmarkStore,
    config: &mut Config,
    config_path: Option<&PathBuf>,
    args: RestoreArgs,
    output: &Output,
) -> Result<()> {
    let bundle = BackupBundle::read_file(&args.path)
        .with_context(|| format!("Failed to read backup: {:?}", args.path))?;

    let mode = if args.merge {
        RestoreMode::Merge
    } else {
        RestoreMode::Replace
    };

    if mode == RestoreMode::Replace && !args.yes && output.should_prompt() {
        println!(
            "Replace {} existing link(s) with {} from the backup?",
            store.links().len(),
            bundle.links.len()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let remote = bundle.remote_config();
    let restored = bundle
        .restore_into(store, mode)
        .context("Failed to restore backup")?;

    if args.with_remote {
        match remote {
            Some(remote) => {
                config.remote_url = Some(remote.url);
                config.remote_username = Some(remote.username).filter(|u| !u.is_empty());
                config.remote_password = Some(remote.password).filter(|p| !p.is_empty());
                config.remote_enabled = remote.enabled;
                let save_path = config_path
                    .cloned()
                    .unwrap_or_else(Config::config_file_path);
                config
                    .save_to_path(&save_path)
                    .context("Failed to save configuration")?;
                output.message("Restored remote backup settings");
            }
            None => output.message("Backup carries no remote settings"),
        }
    }

    output.success(&format!("Restored {} link(s)", restored));
    Ok(())
}
