//! The CLI: a thin wrapper over the library (spec §10.5). Contains no
//! analysis logic of its own — only argument parsing, settings loading, and
//! formatting of `Analyzer` results.

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, QueryCommand};
