//! Command-line interface definitions for ao2vis.
//!
//! Global options (verbosity, config file, error format) come before the
//! subcommand.
//!
//! # Example
//!
//! ```bash
//! # List mounted characters, served from cache when possible
//! ao2vis list
//!
//! # Force a rebuild and print JSON for scripting
//! ao2vis list --refresh --output json
//!
//! # Show emote 3 as Phoenix's preview
//! ao2vis preview Phoenix 3
//!
//! # Verbose mode for debugging
//! ao2vis -v refresh
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Cached overview of AO2 character folders.
///
/// ao2vis enumerates the character folders mounted from your AO2 base
/// folders, projects each into a display record (emotes, size, readme,
/// preview, integrity state) and caches the result in memory and on disk.
#[derive(Debug, Parser)]
#[command(name = "ao2vis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Settings file to use instead of the platform default
    #[arg(long, value_name = "PATH", global = true, env = "AO2VIS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print errors as JSON objects on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List character folders
    List(ListArgs),
    /// Rebuild the cache from disk
    Refresh,
    /// Delete the memory and disk caches
    Invalidate,
    /// Choose which emote is shown as a character's preview
    Preview(PreviewArgs),
    /// Re-read a character's integrity report
    Reverify(NameArgs),
    /// Move a character folder to the system trash
    Delete(DeleteArgs),
}

/// Arguments for the list subcommand.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Ignore cached results and rebuild
    #[arg(long)]
    pub refresh: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the preview subcommand.
#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Character name
    pub name: String,

    /// Emote id (1-based, as in char.ini)
    #[arg(value_parser = clap::value_parser!(u32).range(1..))]
    pub emote_id: u32,
}

/// A single character name.
#[derive(Debug, Args)]
pub struct NameArgs {
    /// Character name
    pub name: String,
}

/// Arguments for the delete subcommand.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Character name
    pub name: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    Table,
    /// JSON for scripting
    Json,
}
