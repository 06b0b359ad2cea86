//! Shelf CLI
//!
//! Command-line interface for Shelf - a personal book catalog.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use shelf_core::{Catalog, Config, SortOrder};

mod commands;
mod output;
mod tui;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "shelf")]
#[command(about = "Shelf - Browse your book catalog")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the TUI interface
    Tui,
    /// List books
    #[command(alias = "ls")]
    List {
        /// Only books in this category
        #[arg(short, long)]
        category: Option<String>,
        /// Only books from this year
        #[arg(short, long)]
        year: Option<i32>,
        /// Sort order (recent, oldest, title, author)
        #[arg(short, long)]
        sort: Option<SortOrder>,
    },
    /// Show book details
    Show {
        /// Book ID
        id: String,
    },
    /// List categories with book counts
    Categories,
    /// List publication years
    Years,
    /// Pick random books, avoiding recent picks
    Random {
        /// Number of books to pick
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, books_file, log_file, cell_width, cell_height, default_sort)
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

    // The TUI sets up its own file logging
    if !matches!(&cli.command, Some(Commands::Tui) | None) {
        init_cli_logging();
    }

    // Commands that don't need the catalog
    if let Some(Commands::Config { command }) = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    let catalog = load_catalog(&config)?;

    match cli.command {
        None | Some(Commands::Tui) => tui::run(catalog, &config).await,
        Some(Commands::List {
            category,
            year,
            sort,
        }) => commands::book::list(
            &catalog,
            category,
            year,
            sort.unwrap_or(config.default_sort),
            &output,
        ),
        Some(Commands::Show { id }) => commands::book::show(&catalog, id, &output),
        Some(Commands::Categories) => commands::catalog::categories(&catalog, &output),
        Some(Commands::Years) => commands::catalog::years(&catalog, &output),
        Some(Commands::Random { count }) => commands::book::random(&catalog, count, &output),
        Some(Commands::Config { .. }) => unreachable!(), // Handled above
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Load the catalog, printing a hint for errors the user can fix
fn load_catalog(config: &Config) -> Result<Catalog> {
    let path = config.books_path();
    Catalog::load(&path).map_err(|e| {
        if let Some(hint) = e.recovery_suggestion() {
            eprintln!("Hint: {}", hint);
        }
        anyhow::Error::new(e).context(format!("Failed to load catalog from {}", path.display()))
    })
}

/// Log to stderr for plain commands; SHELF_LOG overrides the `warn` default
fn init_cli_logging() {
    let level = std::env::var("SHELF_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = EnvFilter::new(format!("shelf_core={},shelf={}", level, level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
