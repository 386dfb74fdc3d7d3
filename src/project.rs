//! The `Project` collaborator (spec §6.1): the core's only view of "files on
//! disk". Grounded in the teacher's `FileWalker` (gitignore-aware directory
//! walk via the `ignore` crate) and `Settings` for exclusion patterns.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::parsing::registry::LanguageId;

/// A content hash used by the update controller (spec §4.11) to tell
/// whether a file changed without re-parsing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ContentHash(pub [u8; 32]);

pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    ContentHash(hasher.finalize().into())
}

/// One file the project knows about. Carries no `FileId`: assigning and
/// remembering stable ids across runs is the update controller's job (spec
/// invariant: a re-analyzed file keeps its `FileId`), not the project
/// collaborator's — a fresh directory walk has no memory of past runs.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    pub path: PathBuf,
    pub language: LanguageId,
}

/// The project abstraction the core consumes. The core never writes to
/// source files through this trait (spec §6.1).
pub trait Project: Send + Sync {
    fn root(&self) -> &Path;

    /// All files this project considers part of the analyzed set, with
    /// their detected language.
    fn files(&self) -> Vec<ProjectFile>;

    /// Reads a file's raw bytes and its content hash.
    fn content_of(&self, file: &ProjectFile) -> AnalyzerResult<(Vec<u8>, ContentHash)>;

    /// Directories excluded from analysis (for diagnostics/CLI display).
    fn excluded_dirs(&self) -> &[String];

    /// Per-language directory for persisted state (spec §6.3): distinct per
    /// project and per language so multiple worktrees don't collide.
    fn storage_path(&self, language: LanguageId) -> PathBuf;
}

/// A filesystem-backed `Project`, built on the same gitignore-aware walk the
/// teacher's `FileWalker` performs.
pub struct FsProject {
    root: PathBuf,
    index_path: PathBuf,
    ignore_patterns: Vec<String>,
    excluded_dirs: Vec<String>,
}

impl FsProject {
    pub fn new(root: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_path: index_path.into(),
            ignore_patterns: default_ignore_patterns(),
            excluded_dirs: default_excluded_dirs(),
        }
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        "target/**".into(),
        "node_modules/**".into(),
        ".git/**".into(),
        "dist/**".into(),
        "build/**".into(),
    ]
}

fn default_excluded_dirs() -> Vec<String> {
    vec![
        "target".into(),
        "node_modules".into(),
        ".git".into(),
        "dist".into(),
        "build".into(),
    ]
}

impl Project for FsProject {
    fn root(&self) -> &Path {
        &self.root
    }

    fn files(&self) -> Vec<ProjectFile> {
        use ignore::WalkBuilder;

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .hidden(false)
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .follow_links(false)
            .max_depth(None)
            .require_git(false);

        let mut overrides = ignore::overrides::OverrideBuilder::new(&self.root);
        for pattern in &self.ignore_patterns {
            if let Err(err) = overrides.add(&format!("!{pattern}")) {
                tracing::warn!(%pattern, %err, "invalid ignore pattern");
            }
        }
        if let Ok(built) = overrides.build() {
            builder.overrides(built);
        }

        builder
            .build()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .filter_map(|entry| {
                let path = entry.path();
                let language = LanguageId::from_path(path)?;
                Some(ProjectFile {
                    path: path.to_path_buf(),
                    language,
                })
            })
            .collect()
    }

    fn content_of(&self, file: &ProjectFile) -> AnalyzerResult<(Vec<u8>, ContentHash)> {
        let bytes = std::fs::read(&file.path).map_err(|source| AnalyzerError::FileRead {
            path: file.path.clone(),
            source,
        })?;
        let hash = hash_bytes(&bytes);
        Ok((bytes, hash))
    }

    fn excluded_dirs(&self) -> &[String] {
        &self.excluded_dirs
    }

    fn storage_path(&self, language: LanguageId) -> PathBuf {
        self.index_path.join(language.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_content_sensitive() {
        let a = hash_bytes(b"fn main() {}");
        let b = hash_bytes(b"fn main() {}");
        let c = hash_bytes(b"fn main() { }");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
