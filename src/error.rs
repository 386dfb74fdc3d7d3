//! Error types for symbolscope.
//!
//! Mirrors the structured, thiserror-based error design used throughout the
//! codebase-intelligence lineage this crate descends from: every variant
//! carries the context needed to act on the failure, and read-only analyzer
//! queries never propagate these — they recover locally per the error policy
//! in spec §7 and return empty results instead.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::FileId;

/// Errors that can be *surfaced* to a caller: construction failures and
/// explicit state-load failures (spec §7). Everything else is logged and
/// recovered internally.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("malformed signature literal '{input}': must be empty/absent or wrapped in parentheses")]
    MalformedSignature { input: String },

    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file '{path}': {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to persist analyzer state to '{path}': {source}")]
    PersistenceError {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to load analyzer state from '{path}': {reason}")]
    StateLoadError { path: PathBuf, reason: String },

    #[error("persisted state at '{path}' is format version {found}, this build understands version {expected}")]
    UnsupportedStateVersion {
        path: PathBuf,
        found: u32,
        expected: u32,
    },

    #[error("file {id:?} is not present in this snapshot")]
    FileNotFound { id: FileId },

    #[error("invalid configuration: {reason}")]
    ConfigError { reason: String },

    #[error("{0}")]
    General(String),
}

pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Non-fatal diagnostics produced while analyzing a single file. These are
/// logged (see `crate::logging`) rather than returned as errors, per spec
/// §7: `ParseError`, `QueryCaptureError`, and `ImportResolutionError` are
/// always recovered locally.
#[derive(Debug, Clone)]
pub enum Diagnostic {
    ParseError {
        file: FileId,
        language: &'static str,
        reason: String,
    },
    QueryCaptureError {
        file: FileId,
        reason: String,
    },
    ImportResolutionError {
        file: FileId,
        import: String,
        reason: String,
    },
    CycleBroken {
        from_fqn: String,
        to_fqn: String,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::ParseError {
                file,
                language,
                reason,
            } => write!(f, "parse error in {file:?} ({language}): {reason}"),
            Diagnostic::QueryCaptureError { file, reason } => {
                write!(f, "unclassifiable capture in {file:?}: {reason}")
            }
            Diagnostic::ImportResolutionError {
                file,
                import,
                reason,
            } => write!(f, "import '{import}' in {file:?} did not resolve: {reason}"),
            Diagnostic::CycleBroken { from_fqn, to_fqn } => write!(
                f,
                "broke inheritance cycle: ignored edge {from_fqn} -> {to_fqn}"
            ),
        }
    }
}

/// Logs a diagnostic at the level appropriate to its kind (spec §7).
pub fn log_diagnostic(diag: &Diagnostic) {
    match diag {
        Diagnostic::ParseError { .. } => tracing::error!(%diag, "parse error"),
        Diagnostic::QueryCaptureError { .. } => tracing::warn!(%diag, "capture classification failed"),
        Diagnostic::ImportResolutionError { .. } => tracing::warn!(%diag, "import resolution failed"),
        Diagnostic::CycleBroken { .. } => tracing::warn!(%diag, "inheritance cycle"),
    }
}
