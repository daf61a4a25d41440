//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Build and reorder hierarchical navigation trees
#[derive(Parser, Debug)]
#[command(name = "navtree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity: -d info, -dd debug, -ddd trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Navigation value file (JSON); falls back to `value_file` from config
    #[arg(short, long, global = true, env = "NAVTREE_FILE", value_hint = ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the tree
    Show,

    /// Append a node
    Add {
        /// Node label
        #[arg(short, long)]
        label: String,
        /// Node slug
        #[arg(short, long)]
        slug: Option<String>,
        /// Node type (one of the configured type options)
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
        /// Parent node path (e.g. `0.1`) or `root`
        #[arg(short, long, default_value = "root")]
        parent: String,
        /// Rewrite the file instead of printing
        #[arg(short = 'i', long)]
        in_place: bool,
    },

    /// Move a node with its subtree
    Move {
        /// Node path, e.g. `0.1`
        node: String,
        /// New parent path or `root`
        #[arg(short, long, default_value = "root")]
        parent: String,
        /// Position among the new siblings, counted without the moved node
        #[arg(short = 'n', long)]
        index: usize,
        /// Rewrite the file instead of printing
        #[arg(short = 'i', long)]
        in_place: bool,
    },

    /// Replay a drag event script
    Drag {
        /// Script file, one event per line
        #[arg(short = 'x', long, value_hint = ValueHint::FilePath)]
        script: PathBuf,
        /// Rewrite the file instead of printing
        #[arg(short = 'i', long)]
        in_place: bool,
    },

    /// Verify the file survives a load/serialize round-trip unchanged
    Check,

    /// Normalize formatting
    Fmt {
        /// Rewrite the file instead of printing
        #[arg(short = 'i', long)]
        in_place: bool,
    },

    /// Show effective settings
    Config,

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
