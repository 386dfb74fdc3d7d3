//! The update controller (spec §4.11 / §5): turns a fresh directory listing
//! into an incremental delta against the previous `SymbolIndex` snapshot.
//!
//! Owns the one piece of state that survives across runs besides the index
//! itself: the path -> `FileId` table (`project.rs` deliberately assigns no
//! ids, so a re-analyzed file keeps the same one here). Everything else —
//! the new index, the parse cache entries — is produced fresh and handed
//! back to the caller to swap in atomically (design note §9: "mutable
//! global state becomes immutable snapshots swapped atomically").

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::capture::capture_file;
use crate::error::{log_diagnostic, Diagnostic};
use crate::index::{FileProperties, SymbolIndex};
use crate::parse_cache::ParseCache;
use crate::parsing::registry::{self, LanguageId};
use crate::parsing::{DuplicatePolicy, ImportContext, ImportTarget, LanguageProfile};
use crate::project::{ContentHash, Project, ProjectFile};
use crate::raw_declaration::ParentKey;
use crate::types::FileId;

/// The persistent path -> `FileId` table. Serialized alongside the index so
/// a process restart doesn't renumber every file and invalidate callers
/// holding on to ids from a previous session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileIdTable {
    next: u32,
    ids: HashMap<PathBuf, FileId>,
}

impl FileIdTable {
    pub fn new() -> Self {
        Self {
            next: 0,
            ids: HashMap::new(),
        }
    }

    pub fn id_for(&mut self, path: &Path) -> FileId {
        if let Some(&id) = self.ids.get(path) {
            return id;
        }
        self.next += 1;
        let id = FileId::new(self.next).expect("counter starts at 1 and only increments");
        self.ids.insert(path.to_path_buf(), id);
        id
    }

    pub fn existing_id_for(&self, path: &Path) -> Option<FileId> {
        self.ids.get(path).copied()
    }

    pub fn path_for(&self, id: FileId) -> Option<&Path> {
        self.ids.iter().find(|(_, &v)| v == id).map(|(k, _)| k.as_path())
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    pub added: usize,
    pub modified: usize,
    pub removed: usize,
    pub unchanged: usize,
}

impl UpdateReport {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.modified == 0 && self.removed == 0
    }
}

/// Runs one incremental update pass.
///
/// `changed_paths`, when given, bounds the pass to exactly those paths
/// (spec §4.11: "must not hang on filtered-out other-language files" — a
/// targeted update never re-walks or re-hashes the rest of the project).
/// `None` means a full pass: every project file is hash-checked against the
/// previous snapshot and anything not seen at all is treated as deleted.
pub fn update(
    project: &dyn Project,
    parse_cache: &ParseCache,
    ids: &mut FileIdTable,
    previous: &SymbolIndex,
    changed_paths: Option<&[PathBuf]>,
) -> (SymbolIndex, UpdateReport) {
    let registry = registry::registry();
    let all_files = project.files();
    let by_path: HashMap<&Path, &ProjectFile> = all_files.iter().map(|f| (f.path.as_path(), f)).collect();

    let candidates: Vec<ProjectFile> = match changed_paths {
        Some(paths) => paths
            .iter()
            .filter_map(|p| by_path.get(p.as_path()).map(|f| (*f).clone()))
            .collect(),
        None => all_files.clone(),
    };

    let mut next = previous.clone();
    let mut report = UpdateReport::default();

    // Deletions: only detectable in a full pass, since a targeted update has
    // no way to distinguish "not in this batch" from "gone".
    if changed_paths.is_none() {
        let known_paths: HashSet<&Path> = all_files.iter().map(|f| f.path.as_path()).collect();
        let stale: Vec<FileId> = ids
            .ids
            .iter()
            .filter(|(path, _)| !known_paths.contains(path.as_path()))
            .map(|(_, &id)| id)
            .collect();
        for id in stale {
            if previous.file_properties(id).is_some() {
                report.removed += 1;
            }
            next.remove_file(id);
            parse_cache.invalidate(id);
        }
    }

    // Reading file content can run in parallel; assigning ids cannot, since
    // `FileIdTable` has no interior mutability (single-writer by design).
    let read: Vec<(&ProjectFile, Vec<u8>, ContentHash)> = candidates
        .par_iter()
        .filter_map(|file| match project.content_of(file) {
            Ok((raw, hash)) => Some((file, raw, hash)),
            Err(err) => {
                tracing::warn!(path = %file.path.display(), %err, "failed to read file during update");
                None
            }
        })
        .collect();

    struct Prepared {
        file_id: FileId,
        path: PathBuf,
        language: LanguageId,
        raw: Vec<u8>,
        hash: ContentHash,
        is_new: bool,
    }

    let prepared: Vec<Prepared> = read
        .into_iter()
        .map(|(file, raw, hash)| {
            let file_id = ids.id_for(&file.path);
            let is_new = previous.file_properties(file_id).is_none();
            Prepared {
                file_id,
                path: file.path.clone(),
                language: file.language,
                raw,
                hash,
                is_new,
            }
        })
        .collect();

    let changed: Vec<&Prepared> = prepared
        .iter()
        .filter(|p| {
            previous
                .file_properties(p.file_id)
                .and_then(|props| props.content_hash)
                != Some(p.hash)
        })
        .collect();
    report.unchanged += prepared.len() - changed.len();

    if changed.is_empty() {
        return (next, report);
    }

    struct CapturedFile {
        file_id: FileId,
        hash: ContentHash,
        declarations: Vec<crate::raw_declaration::RawDeclaration>,
        imports: Vec<String>,
        reexports: Vec<crate::reexport::ReexportInfo>,
        profile: Arc<dyn LanguageProfile>,
        path: PathBuf,
        is_new: bool,
    }

    let mut captures: Vec<CapturedFile> = changed
        .par_iter()
        .filter_map(|p| {
            let profile = registry.get(p.language)?;
            let (tree, content) = parse_cache.get_or_parse(p.file_id, &p.raw, p.hash, &profile);
            let source = content.text();
            let result = capture_file(p.file_id, &p.path, &tree, source, &profile);
            Some(CapturedFile {
                file_id: p.file_id,
                hash: p.hash,
                declarations: result.declarations,
                imports: result.imports,
                reexports: result.reexports,
                profile,
                path: p.path.clone(),
                is_new: p.is_new,
            })
        })
        .collect();

    let mut touched_names: HashSet<String> = HashSet::new();
    for capture in &captures {
        next.remove_file(capture.file_id);
    }

    for capture in &mut captures {
        let mut top_level_order = Vec::new();
        // `own_key` is name-only (kind is not part of it), so two same-named
        // sibling declarations share a key regardless of kind — this is what
        // lets container merging (TypeScript interface/namespace, spec §4.4)
        // fall out of the same `LastWins`/`FirstWins` bookkeeping as ordinary
        // duplicate declarations, with no merge-specific capture logic.
        let mut seen_keys: HashMap<ParentKey, crate::index::UnitId> = HashMap::new();
        for decl in capture.declarations.drain(..) {
            let is_top_level = decl.parent_key.is_none();
            touched_names.insert(decl.simple_name.to_string());
            let own_key = decl.own_key.clone();
            let policy = capture.profile.duplicate_policy(decl.kind);
            let (unit, metadata) = decl.into_unit(capture.profile.as_ref());
            touched_names.insert(unit.fq_name());

            let id = match policy {
                DuplicatePolicy::PreserveAll => next.insert(unit, metadata),
                DuplicatePolicy::FirstWins => {
                    if let Some(&existing) = seen_keys.get(&own_key) {
                        existing
                    } else {
                        let id = next.insert(unit, metadata);
                        seen_keys.insert(own_key, id);
                        id
                    }
                }
                DuplicatePolicy::LastWins => {
                    if let Some(&existing) = seen_keys.get(&own_key) {
                        next.replace(existing, unit, metadata);
                        existing
                    } else {
                        let id = next.insert(unit, metadata);
                        seen_keys.insert(own_key, id);
                        id
                    }
                }
            };
            if is_top_level && !top_level_order.contains(&id) {
                top_level_order.push(id);
            }
        }

        if capture.is_new {
            report.added += 1;
        } else {
            report.modified += 1;
        }

        next.set_file_properties(
            capture.file_id,
            FileProperties {
                imports: capture.imports.clone(),
                resolved_imports: Vec::new(),
                reexports: capture.reexports.clone(),
                top_level_order,
                content_hash: Some(capture.hash),
            },
        );
    }

    // Cross-file relations: every changed file's own imports, plus any
    // *other* file whose raw import text mentions a name this pass touched
    // (spec §4.11: "recomputed only for changed files and their importers",
    // bounded by this substring check rather than a full project rescan).
    let changed_ids: HashSet<FileId> = captures.iter().map(|c| c.file_id).collect();
    let importer_ids: Vec<FileId> = all_files
        .iter()
        .filter_map(|f| ids.existing_id_for(&f.path))
        .filter(|id| !changed_ids.contains(id))
        .filter(|&id| {
            next.file_properties(id)
                .is_some_and(|props| props.imports.iter().any(|imp| touched_names.iter().any(|n| imp.contains(n.as_str()))))
        })
        .collect();

    for capture in &captures {
        resolve_imports_for_file(&mut next, capture.file_id, &capture.path, capture.profile.as_ref());
    }
    for id in importer_ids {
        let Some(path) = ids.path_for(id).map(Path::to_path_buf) else { continue };
        let Some(language) = by_path.get(path.as_path()).map(|f| f.language) else { continue };
        let Some(profile) = registry.get(language) else { continue };
        resolve_imports_for_file(&mut next, id, &path, profile.as_ref());
    }

    (next, report)
}

fn resolve_imports_for_file(index: &mut SymbolIndex, file: FileId, path: &Path, profile: &dyn LanguageProfile) {
    let Some(props) = index.file_properties(file).cloned() else { return };
    let package = props
        .top_level_order
        .first()
        .and_then(|&id| index.unit(id))
        .map(|u| u.package_name.to_string())
        .unwrap_or_default();
    let ctx = ImportContext {
        file_package: &package,
        file_path: path,
    };

    let mut resolved = Vec::new();
    for raw_import in &props.imports {
        match profile.resolve_import(&ctx, raw_import) {
            Some(ImportTarget::Named(target)) => {
                let mut ids = index.by_fqn(&target).to_vec();
                if ids.is_empty() {
                    if let Some(last) = target.rsplit('.').next() {
                        ids = index.by_simple_identifier(last).to_vec();
                    }
                }
                if ids.is_empty() {
                    log_diagnostic(&Diagnostic::ImportResolutionError {
                        file,
                        import: raw_import.clone(),
                        reason: format!("no unit found for '{target}'"),
                    });
                }
                resolved.extend(ids);
            }
            Some(ImportTarget::Wildcard(prefix)) => {
                let matches: Vec<_> = index
                    .all_units()
                    .filter(|(_, unit)| unit.package_name.as_ref() == prefix.as_str())
                    .map(|(id, _)| id)
                    .collect();
                resolved.extend(matches);
            }
            None => {}
        }
    }

    let mut props = props;
    props.resolved_imports = resolved;
    index.set_file_properties(file, props);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::hash_bytes;

    /// A fixed snapshot of file contents; mutating "the project" between
    /// update passes means building a new `FakeProject`, not reaching for
    /// interior mutability (`Project: Send + Sync` rules out anything
    /// `!Sync` like `RefCell` anyway).
    struct FakeProject {
        files: Vec<(PathBuf, &'static str, LanguageId)>,
    }

    impl Project for FakeProject {
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

        fn content_of(&self, file: &ProjectFile) -> crate::error::AnalyzerResult<(Vec<u8>, ContentHash)> {
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

    #[test]
    fn first_pass_adds_every_file_and_second_pass_is_a_noop() {
        let project = FakeProject {
            files: vec![(PathBuf::from("lib.rs"), "fn add(a: i32) -> i32 { a }", registry::RUST)],
        };
        let cache = ParseCache::new();
        let mut ids = FileIdTable::new();

        let (first, report) = update(&project, &cache, &mut ids, &SymbolIndex::new(), None);
        assert_eq!(report.added, 1);
        assert_eq!(first.by_simple_identifier("add").len(), 1);

        let (second, report2) = update(&project, &cache, &mut ids, &first, None);
        assert!(report2.is_noop());
        assert_eq!(second.len(), first.len());
    }

    #[test]
    fn deleting_a_file_removes_its_units() {
        let project = FakeProject {
            files: vec![(PathBuf::from("lib.rs"), "fn add(a: i32) -> i32 { a }", registry::RUST)],
        };
        let cache = ParseCache::new();
        let mut ids = FileIdTable::new();
        let (first, _) = update(&project, &cache, &mut ids, &SymbolIndex::new(), None);

        let empty_project = FakeProject { files: vec![] };
        let (second, report) = update(&empty_project, &cache, &mut ids, &first, None);
        assert_eq!(report.removed, 1);
        assert!(second.by_simple_identifier("add").is_empty());
    }

    #[test]
    fn python_redeclaring_a_class_keeps_only_one_class_unit() {
        // Python's duplicate policy for non-function kinds is `LastWins`
        // (spec §4.4): the second `class Config` replaces the first as the
        // single surviving `CodeUnit`, while both bodies' methods (always
        // `PreserveAll`) still show up as its children, since both
        // declarations share the same name-only `own_key`.
        let project = FakeProject {
            files: vec![(
                PathBuf::from("config.py"),
                "class Config:\n    def first(self):\n        pass\n\nclass Config:\n    def second(self):\n        pass\n",
                registry::PYTHON,
            )],
        };
        let cache = ParseCache::new();
        let mut ids = FileIdTable::new();
        let (index, _) = update(&project, &cache, &mut ids, &SymbolIndex::new(), None);

        let configs = index.by_simple_identifier("Config");
        assert_eq!(configs.len(), 1);
        let config_id = configs[0];
        let own_key = index.metadata(config_id).unwrap().own_key.clone();
        let mut children: Vec<&str> = index.children_of(&own_key).iter().filter_map(|&id| index.unit(id)).map(|u| u.identifier()).collect();
        children.sort_unstable();
        assert_eq!(children, vec!["first", "second"]);
    }

    #[test]
    fn targeted_update_only_touches_the_given_paths() {
        let project = FakeProject {
            files: vec![
                (PathBuf::from("a.rs"), "fn a() {}", registry::RUST),
                (PathBuf::from("b.rs"), "fn b() {}", registry::RUST),
            ],
        };
        let cache = ParseCache::new();
        let mut ids = FileIdTable::new();
        let (first, _) = update(&project, &cache, &mut ids, &SymbolIndex::new(), None);

        let modified_project = FakeProject {
            files: vec![
                (PathBuf::from("a.rs"), "fn a() { 1 }", registry::RUST),
                (PathBuf::from("b.rs"), "fn b() {}", registry::RUST),
            ],
        };
        let (second, report) = update(&modified_project, &cache, &mut ids, &first, Some(&[PathBuf::from("a.rs")]));
        assert_eq!(report.modified, 1);
        assert_eq!(report.added, 0);
        assert_eq!(second.by_simple_identifier("b").len(), 1);
    }
}
