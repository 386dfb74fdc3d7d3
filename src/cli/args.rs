//! Command-line argument definitions (spec §10.5).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "symbolscope")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Multi-language static code analyzer with a queryable symbol index")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default `.symbolscope/settings.toml`.
    Init {
        /// Overwrite an existing configuration file.
        #[arg(short, long)]
        force: bool,
    },

    /// Full (re)build of the symbol index.
    Index {
        /// Root directory to analyze.
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Rebuild even if a persisted index already exists.
        #[arg(short, long)]
        force: bool,
    },

    /// Incremental update against the persisted index.
    Update {
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Query the symbol index.
    Query {
        #[command(subcommand)]
        query: QueryCommand,

        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum QueryCommand {
    /// Full reconstruction of a declaration's signatures (spec §4.6).
    Skeleton { fqn: String },

    /// Exact source text of a class declaration (spec §4.7).
    Source { fqn: String },

    /// Every `CodeUnit` matching a fully-qualified name.
    Definitions { fqn: String },

    /// Identifier / inferred type at `file:byte-offset` (spec §4.10).
    At {
        /// `path/to/file:offset`, e.g. `src/lib.rs:128`.
        location: String,
    },

    /// Heuristic receiver extraction for one expression (spec §4.9).
    Receiver {
        expression: String,
        #[arg(short, long)]
        language: String,
    },
}
