//! Status command handler

use anyhow::Result;

use linkdeck_core::{BookmarkStore, Config, JsonFilePersistence, PersistenceHealth};

use crate::output::{Output, OutputFormat};

/// Show storage, remote and content summary
pub fn show(store: &BookmarkStore, config: &Config, output: &Output) -> Result<()> {
    let persistence = JsonFilePersistence::new(config);
    let snapshot = store.snapshot();
    let pinned = snapshot.pinned_count();
    let health = match store.persistence_health() {
        PersistenceHealth::Healthy => "healthy".to_string(),
        PersistenceHealth::Degraded { reason, .. } => format!("degraded ({})", reason),
    };

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "storage": {
                        "path": persistence.path(),
                        "exists": persistence.exists(),
                        "size": persistence.size(),
                        "health": health
                    },
                    "remote": {
                        "enabled": config.remote_enabled,
                        "url": config.remote_url
                    },
                    "counts": {
                        "links": snapshot.links.len(),
                        "pinned": pinned,
                        "categories": snapshot.categories.len()
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", snapshot.links.len());
        }
        OutputFormat::Human => {
            println!("LinkDeck Status");
            println!("===============");
            println!();
            println!("Storage:");
            println!("  Location: {}", store.storage_location());
            println!("  Size:     {}", human_size(persistence.size()));
            println!("  Health:   {}", health);
            println!();
            println!("Remote backup:");
            println!(
                "  Status: {}",
                if config.remote_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            if let Some(ref url) = config.remote_url {
                println!("  Server: {}", url);
            }
            println!();
            println!("Contents:");
            println!("  Links:      {}", snapshot.links.len());
            println!("  Pinned:     {}", pinned);
            println!("  Categories: {}", snapshot.categories.len());
        }
    }

    Ok(())
}

fn human_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
