//! Versioned persistence of the symbol index to disk (spec §6.3).
//!
//! Parse trees and `SourceContent` are never serialized — only the
//! `CodeUnit`s, file metadata, and content hashes needed to resume
//! incremental `update` on the next run. Writes are atomic: serialize to a
//! temp file, then rename over the real path.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, AnalyzerResult};
use crate::index::SymbolIndex;
use crate::update::FileIdTable;

/// Bumped whenever the on-disk shape of `PersistedState` changes in a way
/// that breaks `bincode` compatibility with older files.
pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct PersistedState {
    pub version: u32,
    pub index: SymbolIndex,
    /// The path -> `FileId` table, so a restarted process keeps assigning
    /// the same ids to files it already knew about (spec invariant: a
    /// re-analyzed file keeps its `FileId` across an update).
    pub ids: FileIdTable,
}

pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    #[must_use = "a failed save silently loses the index on process exit"]
    pub fn save(&self, index: &SymbolIndex, ids: &FileIdTable) -> AnalyzerResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| AnalyzerError::FileWrite {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let state = PersistedState {
            version: STATE_VERSION,
            index: index.clone(),
            ids: ids.clone(),
        };
        let bytes = bincode::serialize(&state).map_err(|source| AnalyzerError::PersistenceError {
            path: self.path.clone(),
            source: Box::new(source),
        })?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, bytes).map_err(|source| AnalyzerError::FileWrite {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| AnalyzerError::FileWrite {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    pub fn load(&self) -> AnalyzerResult<(SymbolIndex, FileIdTable)> {
        let bytes = fs::read(&self.path).map_err(|source| AnalyzerError::FileRead {
            path: self.path.clone(),
            source,
        })?;
        let state: PersistedState = bincode::deserialize(&bytes).map_err(|reason| AnalyzerError::StateLoadError {
            path: self.path.clone(),
            reason: reason.to_string(),
        })?;

        if state.version != STATE_VERSION {
            return Err(AnalyzerError::UnsupportedStateVersion {
                path: self.path.clone(),
                found: state.version,
                expected: STATE_VERSION,
            });
        }

        Ok((state.index, state.ids))
    }

    pub fn clear(&self) -> AnalyzerResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|source| AnalyzerError::FileWrite {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn save_then_load_round_trips_an_empty_index() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.bin"));
        let index = SymbolIndex::new();
        let ids = FileIdTable::new();

        store.save(&index, &ids).unwrap();
        assert!(store.exists());

        let (loaded, _) = store.load().unwrap();
        assert_eq!(loaded.len(), index.len());
    }

    #[test]
    fn clear_removes_the_file() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("state.bin"));
        store.save(&SymbolIndex::new(), &FileIdTable::new()).unwrap();
        store.clear().unwrap();
        assert!(!store.exists());
    }
}
