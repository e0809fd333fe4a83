//! Remote backup command handlers

use anyhow::{Context, Result};

use linkdeck_core::{BackupBundle, BookmarkStore, Config, RemoteError, RestoreMode, WebDavClient};

use crate::output::Output;
use crate::prompt::confirm;

/// Upload the current snapshot to the WebDAV server
pub async fn push(store: &BookmarkStore, config: &Config, output: &Output) -> Result<()> {
    let client = WebDavClient::from_config(config)?;
    let bundle = BackupBundle::from_snapshot(&store.snapshot());

    client
        .push(&bundle)
        .await
        .map_err(|e| warn_if_transient(e, output))
        .with_context(|| format!("Failed to push backup to {}", client.backup_url()))?;

    output.success(&format!(
        "Pushed {} link(s) to {}",
        bundle.links.len(),
        client.backup_url()
    ));
    Ok(())
}

/// Download the remote backup and apply it
pub async fn pull(
    store: &mut BookmarkStore,
    config: &Config,
    merge: bool,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let client = WebDavClient::from_config(config)?;
    let bundle = client
        .pull()
        .await
        .map_err(|e| warn_if_transient(e, output))
        .with_context(|| format!("Failed to pull backup from {}", client.backup_url()))?;

    let mode = if merge {
        RestoreMode::Merge
    } else {
        RestoreMode::Replace
    };

    if mode == RestoreMode::Replace && !yes && output.should_prompt() {
        println!(
            "Replace {} local link(s) with {} from {}?",
            store.links().len(),
            bundle.links.len(),
            client.backup_url()
        );
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let restored = bundle
        .restore_into(store, mode)
        .context("Failed to apply remote backup")?;

    output.success(&format!("Pulled {} link(s)", restored));
    Ok(())
}

/// Check that the WebDAV endpoint is reachable with the configured credentials
pub async fn check(config: &Config, output: &Output) -> Result<()> {
    let client = WebDavClient::from_config(config)?;
    client
        .check()
        .await
        .map_err(|e| warn_if_transient(e, output))
        .with_context(|| format!("Remote check failed for {}", client.base_url()))?;

    output.success(&format!("Remote reachable: {}", client.base_url()));
    Ok(())
}

/// Suggest a retry when the failure may clear up by itself
fn warn_if_transient(err: RemoteError, output: &Output) -> RemoteError {
    if let Some(hint) = retry_hint(&err) {
        output.warn(hint);
    }
    err
}

fn retry_hint(err: &RemoteError) -> Option<&'static str> {
    err.is_transient()
        .then_some("The server did not answer in time or is having trouble; try again shortly.")
}
