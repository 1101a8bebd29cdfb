//! # Stockroom CLI (`stock`)
//!
//! Browse, search, and maintain a workshop inventory held by a remote
//! inventory service.
//!
//! ## Usage
//!
//! ```bash
//! stock --config ./config/stock.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `stock items` | List items with search, facet filters, and sorting |
//! | `stock facets` | Show the categories, brands, and models present |
//! | `stock show <id>` | Full detail for one item |
//! | `stock delete <id>` | Delete an item (asks first) |
//! | `stock storage` | Shelves and containers with item counts |
//! | `stock term` | Show, set, or clear the persisted search term |
//! | `stock backup export` | Download a backup archive |
//! | `stock backup import <file>` | Restore the service from a backup |
//! | `stock ask "<question>"` | Ask the service about the inventory |
//! | `stock completions <shell>` | Print a shell completion script |
//!
//! ## Examples
//!
//! ```bash
//! # Search for "solder"; the term is remembered for the next run
//! stock items --search solder
//!
//! # Items listing both brands (brand filters must all match)
//! stock items --brand Acme --brand Zeta
//!
//! # Items with no brand recorded, sorted by location descending
//! stock items --brand Unknown --sort location --desc
//! ```

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use stockroom::config::{self, Config};
use stockroom::{ask, backup, items, logging, storage};
use stockroom_core::query::SortKey;

/// Stockroom CLI: a command-line client for a workshop inventory service.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/stock.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "stock",
    about = "Stockroom: browse, search, and back up a workshop inventory",
    version,
    long_about = "Stockroom fetches the item collection from an inventory service and \
    searches, filters, and sorts it locally. The last search term is remembered between runs."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/stock.toml")]
    config: PathBuf,

    /// Log level for diagnostics on stderr (error, warn, info, debug, trace).
    #[arg(long, global = true, env = "STOCK_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List items.
    ///
    /// Fetches the full collection, then applies the search term, facet
    /// filters, and sort locally. Category filters match any selected
    /// value; brand and model filters must all match. `Unknown` selects
    /// items with no value for that field.
    Items {
        /// Search term (at least 3 characters to take effect). Remembered
        /// for later runs; omit to reuse the remembered term.
        #[arg(long)]
        search: Option<String>,

        /// Category filter (repeatable).
        #[arg(long = "category")]
        categories: Vec<String>,

        /// Brand filter (repeatable).
        #[arg(long = "brand")]
        brands: Vec<String>,

        /// Model filter (repeatable).
        #[arg(long = "model")]
        models: Vec<String>,

        /// Sort column: `category`, `brand-model`, or `location`.
        #[arg(long)]
        sort: Option<SortKey>,

        /// Sort descending instead of ascending.
        #[arg(long, requires = "sort")]
        desc: bool,

        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Show the distinct facet values present in the collection.
    Facets {
        #[arg(long)]
        json: bool,
    },

    /// Show one item in full.
    Show {
        id: i64,

        #[arg(long)]
        json: bool,
    },

    /// Delete an item.
    ///
    /// Asks for confirmation on a terminal. Without a terminal, `--yes`
    /// is required and nothing is sent otherwise.
    Delete {
        id: i64,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Show shelves and their containers.
    Storage {
        #[arg(long)]
        json: bool,
    },

    /// Inspect or change the remembered search term.
    Term {
        #[command(subcommand)]
        action: Option<TermAction>,
    },

    /// Download or restore a backup of the whole inventory.
    Backup {
        #[command(subcommand)]
        action: BackupAction,
    },

    /// Ask a natural-language question about the inventory.
    Ask {
        question: String,

        #[arg(long)]
        json: bool,
    },

    /// Print a shell completion script.
    Completions {
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum TermAction {
    /// Print the remembered term (default).
    Show,
    /// Remember a new term.
    Set { term: String },
    /// Forget the remembered term.
    Clear,
}

#[derive(Subcommand)]
enum BackupAction {
    /// Download a backup archive from the service.
    Export {
        /// Destination file. Defaults to `inventory_backup_<timestamp>.zip`.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Upload a backup archive, replacing all data on the service.
    Import {
        path: PathBuf,

        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level)?;

    // Commands that don't require config
    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "stock", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Term { action } => {
            // Defaults only stand in for a missing file; a broken one is an error
            let cfg = if cli.config.exists() {
                config::load_config(&cli.config)?
            } else {
                Config::minimal()
            };
            match action {
                None | Some(TermAction::Show) => items::run_term_show(&cfg)?,
                Some(TermAction::Set { term }) => items::run_term_set(&cfg, term)?,
                Some(TermAction::Clear) => items::run_term_clear(&cfg)?,
            }
            return Ok(());
        }
        _ => {}
    }

    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Items {
            search,
            categories,
            brands,
            models,
            sort,
            desc,
            json,
        } => {
            let opts = items::ListOptions {
                search,
                categories,
                brands,
                models,
                sort,
                descending: desc,
                json,
            };
            items::run_items(&cfg, opts).await?;
        }
        Commands::Facets { json } => {
            items::run_facets(&cfg, json).await?;
        }
        Commands::Show { id, json } => {
            items::run_show(&cfg, id, json).await?;
        }
        Commands::Delete { id, yes } => {
            items::run_delete(&cfg, id, yes).await?;
        }
        Commands::Storage { json } => {
            storage::run_storage(&cfg, json).await?;
        }
        Commands::Backup { action } => match action {
            BackupAction::Export { output } => {
                backup::run_export(&cfg, output).await?;
            }
            BackupAction::Import { path, yes } => {
                backup::run_import(&cfg, &path, yes).await?;
            }
        },
        Commands::Ask { question, json } => {
            ask::run_ask(&cfg, &question, json).await?;
        }
        Commands::Term { .. } | Commands::Completions { .. } => {
            // Handled above (before config loading)
            unreachable!()
        }
    }

    Ok(())
}
