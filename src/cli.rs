//! Command-line interface definitions for newsfeed.
//!
//! Global flags override values from the configuration file; the API key can
//! also come from the environment.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use newsfeed::config::{Config, DEFAULT_CONFIG_FILE};
use newsfeed::models::SortMode;

/// Command-line arguments for the newsfeed application.
///
/// # Examples
///
/// ```sh
/// # Collect the default sources, then keep only articles about elections
/// newsfeed fetch --filter Election
///
/// # Save everything stored for the Technology category offline
/// newsfeed --category Technology archive
///
/// # Latest articles, filtered and archived in one go
/// newsfeed --sort latest fetch --filter Rally --archive
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the YAML configuration file (created if missing)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// News API key
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Sort mode: top headlines or latest
    #[arg(short, long, value_enum)]
    pub sort: Option<SortMode>,

    /// Source category from the catalog (see `categories`)
    #[arg(long)]
    pub category: Option<String>,

    /// Directory holding the per-source JSON collections
    #[arg(long)]
    pub store_dir: Option<PathBuf>,

    /// Root directory for dated archive snapshots
    #[arg(long)]
    pub archive_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Collect fresh listings for every configured source
    Fetch {
        /// Filter the collected articles afterwards
        #[arg(short, long)]
        filter: Option<String>,

        /// Save the resulting selection offline
        #[arg(short, long)]
        archive: bool,
    },
    /// Print the stored articles
    Show,
    /// Switch to another store directory and print its articles
    Load { dir: PathBuf },
    /// Keep only stored articles whose title or description contains TERM
    Filter {
        term: String,

        /// Save the matches offline
        #[arg(short, long)]
        archive: bool,
    },
    /// Save the selected articles' pages offline
    Archive {
        /// Narrow the selection first
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// List the source categories
    Categories,
}

impl Cli {
    /// Fold the flag overrides into `config`.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(key) = &self.api_key {
            config.api_key = key.clone();
        }
        if let Some(sort) = self.sort {
            config.sort_mode = sort;
        }
        if let Some(dir) = &self.store_dir {
            config.store_dir = dir.clone();
        }
        if let Some(dir) = &self.archive_root {
            config.archive_root = dir.clone();
        }
    }
}
