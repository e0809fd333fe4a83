//! LinkDeck CLI
//!
//! Command-line interface for LinkDeck - ordered bookmark management.

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use linkdeck_core::{BookmarkStore, Config, PersistenceHealth, ALL_CATEGORY_ID, COMMON_CATEGORY_ID};

mod commands;
mod metadata;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "linkdeck")]
#[command(about = "LinkDeck - Ordered bookmark management")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a specific config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage links
    Link {
        #[command(subcommand)]
        command: LinkCommands,
    },
    /// Manage the pinned section
    Pinned {
        #[command(subcommand)]
        command: Option<PinnedCommands>,
    },
    /// Manage categories
    Category {
        #[command(subcommand)]
        command: Option<CategoryCommands>,
    },
    /// Import a browser bookmark export (HTML) or a backup file (JSON)
    Import {
        /// File to import
        file: PathBuf,
        /// Category receiving the bookmarks (or folderless ones with --by-folder)
        #[arg(short, long, default_value = COMMON_CATEGORY_ID)]
        category: String,
        /// Create one category per bookmark folder
        #[arg(long)]
        by_folder: bool,
    },
    /// Export or restore backup files
    Backup {
        #[command(subcommand)]
        command: BackupCommands,
    },
    /// WebDAV remote backup
    Remote {
        #[command(subcommand)]
        command: RemoteCommands,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show storage and content status
    Status,
}

#[derive(Subcommand)]
enum LinkCommands {
    /// Add a new link
    #[command(alias = "create")]
    Add {
        /// URL to save
        url: String,
        /// Title (fetched from the page when omitted)
        #[arg(short = 'T', long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        icon: Option<String>,
        /// Category ID or name
        #[arg(short, long, default_value = COMMON_CATEGORY_ID)]
        category: String,
        /// Do not fetch page metadata
        #[arg(long)]
        no_fetch: bool,
    },
    /// List links in display order
    #[command(alias = "ls")]
    List {
        /// Category ID or name ("all" for every category)
        #[arg(short, long, default_value = ALL_CATEGORY_ID)]
        category: String,
        /// Only links matching this text
        #[arg(short = 'f', long)]
        filter: Option<String>,
    },
    /// Show link details
    Show {
        /// Link ID (full ID or prefix)
        id: String,
    },
    /// Edit a link (prompts when no field is given)
    Edit {
        /// Link ID (full ID or prefix)
        id: String,
        #[arg(short = 'T', long)]
        title: Option<String>,
        #[arg(short, long)]
        url: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        icon: Option<String>,
        /// Category ID or name
        #[arg(short, long)]
        category: Option<String>,
        /// Explicit display order value
        #[arg(long, allow_negative_numbers = true)]
        order: Option<i64>,
        /// Position in the pinned section (1-based; link must be pinned)
        #[arg(long)]
        pinned_position: Option<i64>,
    },
    /// Delete one or more links
    #[command(alias = "rm")]
    Delete {
        /// Link IDs (full ID or prefix)
        #[arg(required = true)]
        ids: Vec<String>,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Move links to another category
    #[command(alias = "mv")]
    Move {
        /// Link IDs (full ID or prefix)
        #[arg(required = true)]
        ids: Vec<String>,
        /// Destination category ID or name
        #[arg(short, long)]
        to: String,
    },
    /// Pin or unpin a link
    Pin {
        /// Link ID (full ID or prefix)
        id: String,
    },
    /// Move a link to the position of another link
    Reorder {
        /// Link being moved
        moved: String,
        /// Link whose position it takes
        target: String,
        /// Category the move happens in ("all" for every category)
        #[arg(short, long, default_value = ALL_CATEGORY_ID)]
        category: String,
        /// Filter text of the view the move happens in
        #[arg(short = 'f', long)]
        filter: Option<String>,
    },
    /// Search links
    Search {
        /// Search query
        query: String,
    },
}

#[derive(Subcommand)]
enum PinnedCommands {
    /// List pinned links
    #[command(alias = "ls")]
    List,
    /// Move a pinned link to the position of another pinned link
    Reorder { moved: String, target: String },
}

#[derive(Subcommand)]
enum CategoryCommands {
    /// List categories with link counts
    #[command(alias = "ls")]
    List,
    /// Add a category
    Add {
        name: String,
        #[arg(short, long)]
        icon: Option<String>,
    },
    /// Rename a category
    Rename {
        /// Category ID or name
        category: String,
        /// New name
        name: String,
        #[arg(short, long)]
        icon: Option<String>,
    },
    /// Delete a category (its links move to Common)
    #[command(alias = "rm")]
    Delete {
        /// Category ID or name
        category: String,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Move a category to the position of another
    Reorder { moved: String, target: String },
}

#[derive(Subcommand)]
enum BackupCommands {
    /// Write all links and categories to a file
    Export {
        file: PathBuf,
        /// Include remote backup settings (credentials included)
        #[arg(long)]
        include_remote: bool,
    },
    /// Restore from a backup file
    Restore {
        file: PathBuf,
        /// Add new links instead of replacing everything
        #[arg(long)]
        merge: bool,
        /// Also restore remote backup settings carried by the file
        #[arg(long)]
        with_remote: bool,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum RemoteCommands {
    /// Upload all data to the remote server
    Push,
    /// Download data from the remote server
    Pull {
        /// Add new links instead of replacing everything
        #[arg(long)]
        merge: bool,
        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Check the remote server is reachable
    Check,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, storage_key, remote_url, remote_enabled, ...)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands don't need the store
    if let Some(Commands::Config { command }) = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(config_path, &output),
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, config_path, &output)
            }
        };
    }

    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let mut store = BookmarkStore::open(&config);
    info!("Opened store at {}", store.storage_location());

    let command = cli.command.unwrap_or(Commands::Link {
        command: LinkCommands::List {
            category: ALL_CATEGORY_ID.to_string(),
            filter: None,
        },
    });

    let result = match command {
        Commands::Link { command } => handle_link_command(command, &mut store, &output).await,
        Commands::Pinned { command } => match command {
            Some(PinnedCommands::List) | None => commands::pinned::list(&store, &output),
            Some(PinnedCommands::Reorder { moved, target }) => {
                commands::pinned::reorder(&mut store, &moved, &target, &output)
            }
        },
        Commands::Category { command } => handle_category_command(command, &mut store, &output),
        Commands::Import {
            file,
            category,
            by_folder,
        } => commands::import::import(&mut store, &file, &category, by_folder, &output),
        Commands::Backup { command } => match command {
            BackupCommands::Export {
                file,
                include_remote,
            } => commands::backup::export(&store, &config, &file, include_remote, &output),
            BackupCommands::Restore {
                file,
                merge,
                with_remote,
                yes,
            } => {
                let args = commands::backup::RestoreArgs {
                    path: file,
                    merge,
                    with_remote,
                    yes,
                };
                commands::backup::restore(&mut store, &mut config, config_path, args, &output)
            }
        },
        Commands::Remote { command } => match command {
            RemoteCommands::Push => commands::remote::push(&store, &config, &output).await,
            RemoteCommands::Pull { merge, yes } => {
                commands::remote::pull(&mut store, &config, merge, yes, &output).await
            }
            RemoteCommands::Check => commands::remote::check(&config, &output).await,
        },
        Commands::Config { .. } => Ok(()), // Handled above
        Commands::Status => commands::status::show(&store, &config, &output),
    };

    report_persistence(&store, &output);
    result
}

async fn handle_link_command(
    command: LinkCommands,
    store: &mut BookmarkStore,
    output: &Output,
) -> Result<()> {
    use commands::link;

    match command {
        LinkCommands::Add {
            url,
            title,
            description,
            icon,
            category,
            no_fetch,
        } => {
            let args = link::AddArgs {
                url,
                title,
                description,
                icon,
                category,
                fetch: !no_fetch,
            };
            link::add(store, args, output).await
        }
        LinkCommands::List { category, filter } => link::list(store, &category, filter, output),
        LinkCommands::Show { id } => link::show(store, &id, output),
        LinkCommands::Edit {
            id,
            title,
            url,
            description,
            icon,
            category,
            order,
            pinned_position,
        } => {
            let args = link::EditArgs {
                title,
                url,
                description,
                icon,
                category,
                order,
                pinned_position,
            };
            link::edit(store, &id, args, output)
        }
        LinkCommands::Delete { ids, yes } => link::delete(store, &ids, yes, output),
        LinkCommands::Move { ids, to } => link::move_to(store, &ids, &to, output),
        LinkCommands::Pin { id } => link::pin(store, &id, output),
        LinkCommands::Reorder {
            moved,
            target,
            category,
            filter,
        } => link::reorder(store, &moved, &target, &category, filter, output),
        LinkCommands::Search { query } => link::search(store, &query, output),
    }
}

fn handle_category_command(
    command: Option<CategoryCommands>,
    store: &mut BookmarkStore,
    output: &Output,
) -> Result<()> {
    use commands::category;

    match command {
        Some(CategoryCommands::List) | None => category::list(store, output),
        Some(CategoryCommands::Add { name, icon }) => category::add(store, &name, icon, output),
        Some(CategoryCommands::Rename {
            category: key,
            name,
            icon,
        }) => category::rename(store, &key, &name, icon, output),
        Some(CategoryCommands::Delete { category: key, yes }) => {
            category::delete(store, &key, yes, output)
        }
        Some(CategoryCommands::Reorder { moved, target }) => {
            category::reorder(store, &moved, &target, output)
        }
    }
}

/// Warn when the last write did not reach disk
fn report_persistence(store: &BookmarkStore, output: &Output) {
    if let PersistenceHealth::Degraded { reason, hint } = store.persistence_health() {
        output.warn(&format!(
            "Changes could not be saved to {}: {}",
            store.storage_location(),
            reason
        ));
        if let Some(hint) = hint {
            output.warn(hint);
        }
    }
}

/// Initialize file logging
///
/// Only initializes if LINKDECK_LOG environment variable is set.
/// Logs to file (config.log_file or default {data_dir}/debug.log).
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("LINKDECK_LOG") else {
        return;
    };

    let log_path = config
        .log_file
        .clone()
        .unwrap_or_else(|| config.data_dir.join("debug.log"));

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "linkdeck_core={},linkdeck={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
