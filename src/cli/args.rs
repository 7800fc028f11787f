//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

/// PokeAPI ingestion: species records with evolution stage resolution
#[derive(Parser, Debug)]
#[command(name = "dexsync")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Print author and version
    #[arg(long)]
    pub info: bool,

    /// Config file to use instead of ./dexsync.toml
    #[arg(short, long, global = true, env = "DEXSYNC_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch records into a table
    Ingest {
        /// Table to fill
        #[arg(short, long, value_enum, default_value_t = TableKind::Pokemon)]
        kind: TableKind,
        /// First pokemon id (default: first_id setting)
        #[arg(long)]
        from: Option<u32>,
        /// Last pokemon id, inclusive (default: last_id setting)
        #[arg(long)]
        to: Option<u32>,
        /// Read documents from a local API mirror instead of HTTP
        #[arg(long, value_hint = ValueHint::DirPath)]
        mirror: Option<PathBuf>,
        /// Table file (default: output, move_output or type_output setting)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Show an evolution chain document and resolve a species in it
    Chain {
        /// Evolution chain JSON file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Species to resolve
        #[arg(short, long)]
        species: Option<String>,
    },

    /// Fetch one record and print it as JSON
    Record {
        /// Upstream id
        id: u32,
        /// Resource kind
        #[arg(short, long, value_enum, default_value_t = TableKind::Pokemon)]
        kind: TableKind,
        /// Read documents from a local API mirror instead of HTTP
        #[arg(long, value_hint = ValueHint::DirPath)]
        mirror: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create config template
    Init {
        /// Create global config
        #[arg(short, long)]
        global: bool,
    },

    /// Show config paths
    Path,
}

/// Record tables dexsync can fill.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum TableKind {
    Pokemon,
    Moves,
    Types,
}
