//! An in-memory `Project` test double for black-box scenario tests, built
//! the way `update.rs`'s own `FakeProject` unit-test fixture is: a fixed
//! snapshot of file contents, no interior mutability (`Project: Send +
//! Sync` rules out `RefCell` anyway).

use std::path::{Path, PathBuf};

use symbolscope::error::AnalyzerResult;
use symbolscope::parsing::registry::LanguageId;
use symbolscope::project::{hash_bytes, ContentHash, Project, ProjectFile};

pub struct MemoryProject {
    files: Vec<(PathBuf, String, LanguageId)>,
}

impl MemoryProject {
    pub fn new(files: Vec<(&str, &str, LanguageId)>) -> Self {
        Self {
            files: files
                .into_iter()
                .map(|(path, content, language)| (PathBuf::from(path), content.to_string(), language))
                .collect(),
        }
    }
}

impl Project for MemoryProject {
    fn root(&self) -> &Path {
        Path::new(".")
    }

    fn files(&self) -> Vec<ProjectFile> {
        self.files
            .iter()
            .map(|(path, _, language)| ProjectFile {
                path: path.clone(),
                language: *language,
            })
            .collect()
    }

    fn content_of(&self, file: &ProjectFile) -> AnalyzerResult<(Vec<u8>, ContentHash)> {
        let (_, content, _) = self.files.iter().find(|(p, _, _)| p == &file.path).unwrap();
        let bytes = content.as_bytes().to_vec();
        let hash = hash_bytes(&bytes);
        Ok((bytes, hash))
    }

    fn excluded_dirs(&self) -> &[String] {
        &[]
    }

    fn storage_path(&self, _language: LanguageId) -> PathBuf {
        PathBuf::from(".")
    }
}
