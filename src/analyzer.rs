//! The `Analyzer`: the public façade wiring together the symbol index, the
//! parse cache, and the file id table behind one read-mostly API (spec
//! §4.1 / §5 / §6).
//!
//! "Mutable global state becomes immutable snapshots swapped atomically"
//! (design note §9): every read method below takes one `Arc<SymbolIndex>`
//! snapshot at the start and answers entirely from it, so a concurrent
//! `update()` can never hand a reader half-old, half-new data.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use regex::Regex;
use tree_sitter::Tree;

use crate::code_unit::{CodeUnit, UnitKind};
use crate::error::{log_diagnostic, AnalyzerResult, Diagnostic};
use crate::extractor::{extract_method_source, extract_source};
use crate::index::{SymbolIndex, UnitId, UnitMetadata};
use crate::parse_cache::ParseCache;
use crate::parsing::registry::{self, LanguageId};
use crate::parsing::LanguageProfile;
use crate::project::{Project, ProjectFile};
use crate::reexport::ReexportInfo;
use crate::signature::Signature;
use crate::skeleton;
use crate::source_content::SourceContent;
use crate::state_io::StateStore;
use crate::type_inference;
use crate::types::FileId;
use crate::update::{self, FileIdTable, UpdateReport};

pub struct Analyzer {
    project: Arc<dyn Project>,
    parse_cache: ParseCache,
    index: RwLock<Arc<SymbolIndex>>,
    ids: Mutex<FileIdTable>,
}

impl Analyzer {
    pub fn new(project: Arc<dyn Project>) -> Self {
        Self {
            project,
            parse_cache: ParseCache::new(),
            index: RwLock::new(Arc::new(SymbolIndex::new())),
            ids: Mutex::new(FileIdTable::new()),
        }
    }

    /// Seeds an analyzer from a previously persisted snapshot (spec §6.3),
    /// falling back to an empty index when none exists yet.
    pub fn open(project: Arc<dyn Project>, state_path: impl Into<PathBuf>) -> AnalyzerResult<Self> {
        let store = StateStore::new(state_path);
        if !store.exists() {
            return Ok(Self::new(project));
        }
        let (index, ids) = store.load()?;
        Ok(Self {
            project,
            parse_cache: ParseCache::new(),
            index: RwLock::new(Arc::new(index)),
            ids: Mutex::new(ids),
        })
    }

    pub fn save(&self, state_path: impl Into<PathBuf>) -> AnalyzerResult<()> {
        let store = StateStore::new(state_path);
        let snapshot = self.snapshot();
        let ids = self.ids.lock();
        store.save(&snapshot, &ids)
    }

    fn snapshot(&self) -> Arc<SymbolIndex> {
        self.index.read().clone()
    }

    pub fn file_id_for(&self, path: &Path) -> Option<FileId> {
        self.ids.lock().existing_id_for(path)
    }

    /// One logical writer: runs a full or targeted incremental pass and
    /// atomically swaps the new snapshot in (spec §5). `cancel` is checked
    /// before the pass starts and again right before the swap; flipping it
    /// mid-pass discards the work in progress and leaves the previous
    /// snapshot untouched, so a cancelled `update` is always a no-op.
    pub fn update(&self, changed_paths: Option<&[PathBuf]>, cancel: &AtomicBool) -> Option<UpdateReport> {
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        let previous = self.snapshot();
        let mut ids = self.ids.lock();
        let (next, report) = update::update(self.project.as_ref(), &self.parse_cache, &mut ids, &previous, changed_paths);
        if cancel.load(Ordering::Relaxed) {
            return None;
        }
        *self.index.write() = Arc::new(next);
        Some(report)
    }

    /// Lazily reconstructs the parse tree and content for `file` (spec
    /// §6.3: "after reload, treeOf(file) must lazily reconstruct parse
    /// trees"). Reads never error — a file that can no longer be read or
    /// whose language is unknown simply yields `None`.
    fn tree_of(&self, file: FileId) -> Option<(Arc<dyn LanguageProfile>, Tree, SourceContent)> {
        let path = self.ids.lock().path_for(file)?.to_path_buf();
        let language = LanguageId::from_path(&path)?;
        let profile = registry::registry().get(language)?;
        let project_file = ProjectFile { path, language };
        let (raw, hash) = self.project.content_of(&project_file).ok()?;
        let (tree, content) = self.parse_cache.get_or_parse(file, &raw, hash, &profile);
        Some((profile, tree, content))
    }

    fn profile_for_file(&self, file: FileId) -> Option<Arc<dyn LanguageProfile>> {
        let path = self.ids.lock().path_for(file)?.to_path_buf();
        let language = LanguageId::from_path(&path)?;
        registry::registry().get(language)
    }

    /// Recovers a `UnitId` for a `CodeUnit` handed back by a previous query.
    /// Cheap when the unit carries a `source` (only that file's units are
    /// scanned); falls back to scanning its fq-name bucket otherwise.
    fn id_of(&self, index: &SymbolIndex, unit: &CodeUnit) -> Option<UnitId> {
        let candidates: &[UnitId] = match unit.source {
            Some(file) => index.units_in_file(file),
            None => index.by_fqn(&unit.fq_name()),
        };
        candidates.iter().copied().find(|&id| index.unit(id).is_some_and(|u| u == unit))
    }

    pub fn get_declarations(&self, file: FileId) -> Vec<CodeUnit> {
        let index = self.snapshot();
        index.units_in_file(file).iter().filter_map(|&id| index.unit(id).cloned()).collect()
    }

    pub fn get_top_level_declarations(&self, file: FileId) -> Vec<CodeUnit> {
        let index = self.snapshot();
        let Some(props) = index.file_properties(file) else {
            return Vec::new();
        };
        props.top_level_order.iter().filter_map(|&id| index.unit(id).cloned()).collect()
    }

    /// Every declaration across the whole project, deduplicated: two files
    /// capturing the identical `(source, kind, packageName, shortName,
    /// signature)` tuple are the same unit by spec I5 regardless of which
    /// capture produced them.
    pub fn get_all_declarations(&self) -> Vec<CodeUnit> {
        let index = self.snapshot();
        let set: HashSet<CodeUnit> = index.all_units().map(|(_, u)| u.clone()).collect();
        set.into_iter().collect()
    }

    pub fn get_definitions(&self, fqn: &str) -> Vec<CodeUnit> {
        let index = self.snapshot();
        index.by_fqn(fqn).iter().filter_map(|&id| index.unit(id).cloned()).collect()
    }

    /// Returns the overload matching `signature` exactly when one is given
    /// and found; otherwise any overload of `fqn` (spec §4.1), or `None`
    /// when `fqn` names no function at all.
    pub fn get_function_definition(&self, fqn: &str, signature: Option<&Signature>) -> Option<CodeUnit> {
        let index = self.snapshot();
        let candidates: Vec<&CodeUnit> = index
            .by_fqn(fqn)
            .iter()
            .filter_map(|&id| index.unit(id))
            .filter(|u| u.kind == UnitKind::Function)
            .collect();

        if let Some(sig) = signature {
            if let Some(exact) = candidates.iter().find(|u| &u.signature == sig) {
                return Some((*exact).clone());
            }
        }
        candidates.first().map(|u| (*u).clone())
    }

    pub fn autocomplete_definitions(&self, prefix: &str) -> Vec<CodeUnit> {
        let index = self.snapshot();
        let needle = prefix.to_lowercase();
        index
            .all_units()
            .filter(|(_, u)| u.identifier().to_lowercase().starts_with(&needle))
            .map(|(_, u)| u.clone())
            .collect()
    }

    /// Full, top-level-outward reconstruction of `fqn`'s declaring class
    /// (spec §4.6).
    pub fn get_skeleton(&self, fqn: &str) -> Option<String> {
        let index = self.snapshot();
        let id = *index.by_fqn(fqn).first()?;
        let file = index.unit(id)?.source?;
        let profile = self.profile_for_file(file)?;
        skeleton::render_skeleton(&index, profile.as_ref(), id)
    }

    /// Skeletons for every top-level declaration of `file`, keyed by unit.
    pub fn get_skeletons(&self, file: FileId) -> HashMap<CodeUnit, String> {
        let index = self.snapshot();
        let Some(profile) = self.profile_for_file(file) else {
            return HashMap::new();
        };
        let Some(props) = index.file_properties(file) else {
            return HashMap::new();
        };
        props
            .top_level_order
            .iter()
            .filter_map(|&id| {
                let unit = index.unit(id)?.clone();
                let text = skeleton::render_skeleton(&index, profile.as_ref(), id)?;
                Some((unit, text))
            })
            .collect()
    }

    pub fn get_skeleton_header(&self, fqn: &str) -> Option<String> {
        let index = self.snapshot();
        let id = *index.by_fqn(fqn).first()?;
        let file = index.unit(id)?.source?;
        let profile = self.profile_for_file(file)?;
        skeleton::render_skeleton_header(&index, profile.as_ref(), id)
    }

    pub fn get_class_source(&self, fqn: &str, include_leading_comments: bool) -> Option<String> {
        let index = self.snapshot();
        let id = index
            .by_fqn(fqn)
            .iter()
            .copied()
            .find(|&id| index.unit(id).is_some_and(|u| u.kind == UnitKind::Class))?;
        let file = index.unit(id)?.source?;
        let (_, _, content) = self.tree_of(file)?;
        let metadata = index.metadata(id)?;
        Some(extract_source(&content, metadata, include_leading_comments))
    }

    /// Every overload of `fqn` joined per spec §4.7: each earlier overload's
    /// signature line, then the last overload's full text.
    pub fn get_method_source(&self, fqn: &str, include_leading_comments: bool) -> Option<String> {
        let index = self.snapshot();
        let mut ids: Vec<UnitId> = index
            .by_fqn(fqn)
            .iter()
            .copied()
            .filter(|&id| index.unit(id).is_some_and(|u| u.kind == UnitKind::Function))
            .collect();
        if ids.is_empty() {
            return None;
        }
        ids.sort_by_key(|&id| index.metadata(id).map(|m| m.declaration_range.start).unwrap_or(0));

        let file = index.unit(ids[0])?.source?;
        let (profile, _, content) = self.tree_of(file)?;
        let metas: Vec<&UnitMetadata> = ids.iter().filter_map(|&id| index.metadata(id)).collect();
        Some(extract_method_source(&content, profile.as_ref(), &metas, include_leading_comments))
    }

    /// The individual source text of every overload sharing `unit`'s file
    /// and fq-name, as a set rather than the joined rendering
    /// `getMethodSource` produces.
    pub fn get_method_sources(&self, unit: &CodeUnit, include_leading_comments: bool) -> HashSet<String> {
        let index = self.snapshot();
        let Some(file) = unit.source else {
            return HashSet::new();
        };
        let Some((_, _, content)) = self.tree_of(file) else {
            return HashSet::new();
        };
        let fqn = unit.fq_name();
        index
            .by_fqn(&fqn)
            .iter()
            .filter_map(|&id| {
                let u = index.unit(id)?;
                if u.kind != UnitKind::Function || u.source != Some(file) {
                    return None;
                }
                let metadata = index.metadata(id)?;
                Some(extract_source(&content, metadata, include_leading_comments))
            })
            .collect()
    }

    pub fn get_direct_children(&self, unit: &CodeUnit) -> Vec<CodeUnit> {
        let index = self.snapshot();
        let Some(id) = self.id_of(&index, unit) else {
            return Vec::new();
        };
        let Some(meta) = index.metadata(id) else {
            return Vec::new();
        };
        index.children_of(&meta.own_key).iter().filter_map(|&cid| index.unit(cid).cloned()).collect()
    }

    /// One hop up the declared base-type list, resolved by simple
    /// identifier within the project (spec §4.5).
    pub fn get_direct_ancestors(&self, unit: &CodeUnit) -> HashSet<CodeUnit> {
        let index = self.snapshot();
        let Some(id) = self.id_of(&index, unit) else {
            return HashSet::new();
        };
        let Some(meta) = index.metadata(id) else {
            return HashSet::new();
        };
        meta.base_types
            .iter()
            .filter_map(|base| resolve_class_by_identifier(&index, base))
            .filter_map(|id| index.unit(id).cloned())
            .collect()
    }

    /// The transitive closure of `getDirectAncestors` (spec §4.5). The
    /// ancestor graph is meant to be a DAG; if a cycle is ever observed
    /// (two classes naming each other, directly or through a longer chain)
    /// it's reported via `Diagnostic::CycleBroken` and that one edge is
    /// ignored rather than looping forever.
    pub fn get_ancestors(&self, unit: &CodeUnit) -> HashSet<CodeUnit> {
        let index = self.snapshot();
        let Some(start_id) = self.id_of(&index, unit) else {
            return HashSet::new();
        };

        let mut result = HashSet::new();
        let mut visited = HashSet::new();
        visited.insert(start_id);
        let mut frontier = vec![start_id];

        while let Some(current) = frontier.pop() {
            let Some(meta) = index.metadata(current) else { continue };
            for base in &meta.base_types {
                let Some(parent_id) = resolve_class_by_identifier(&index, base) else {
                    continue;
                };
                if !visited.insert(parent_id) {
                    log_diagnostic(&Diagnostic::CycleBroken {
                        from_fqn: index.unit(current).map(|u| u.fq_name()).unwrap_or_default(),
                        to_fqn: index.unit(parent_id).map(|u| u.fq_name()).unwrap_or_default(),
                    });
                    continue;
                }
                if let Some(parent_unit) = index.unit(parent_id) {
                    result.insert(parent_unit.clone());
                }
                frontier.push(parent_id);
            }
        }
        result
    }

    pub fn extract_call_receiver(&self, language: LanguageId, expression: &str) -> Option<String> {
        registry::registry().get(language)?.extract_call_receiver(expression)
    }

    pub fn get_identifier_at(&self, file: FileId, offset: usize) -> Option<String> {
        let (_, _, content) = self.tree_of(file)?;
        type_inference::get_identifier_at(&content, offset)
    }

    pub fn infer_type_at(&self, file: FileId, offset: usize) -> Option<CodeUnit> {
        let index = self.snapshot();
        let (_, tree, content) = self.tree_of(file)?;
        let id = type_inference::infer_type_at(&index, &content, &tree, file, offset)?;
        index.unit(id).cloned()
    }

    /// Regex search over fully-qualified names, case-insensitive.
    pub fn search_definitions(&self, pattern: &str) -> Vec<CodeUnit> {
        let index = self.snapshot();
        let Ok(re) = Regex::new(&format!("(?i){pattern}")) else {
            return Vec::new();
        };
        index.all_units().filter(|(_, u)| re.is_match(&u.fq_name())).map(|(_, u)| u.clone()).collect()
    }

    pub fn signatures_of(&self, unit: &CodeUnit) -> Vec<Signature> {
        let index = self.snapshot();
        let fqn = unit.fq_name();
        index.by_fqn(&fqn).iter().filter_map(|&id| index.unit(id)).map(|u| u.signature.clone()).collect()
    }

    pub fn get_reexports(&self, file: FileId) -> Vec<ReexportInfo> {
        let index = self.snapshot();
        index.file_properties(file).map(|p| p.reexports.clone()).unwrap_or_default()
    }

    pub fn imported_code_units_of(&self, file: FileId) -> Vec<CodeUnit> {
        let index = self.snapshot();
        let Some(props) = index.file_properties(file) else {
            return Vec::new();
        };
        props.resolved_imports.iter().filter_map(|&id| index.unit(id).cloned()).collect()
    }
}

fn resolve_class_by_identifier(index: &SymbolIndex, name: &str) -> Option<UnitId> {
    index
        .by_simple_identifier(name)
        .iter()
        .copied()
        .find(|&id| index.unit(id).is_some_and(|u| u.kind == UnitKind::Class))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{hash_bytes, ContentHash};
    use std::sync::atomic::AtomicBool;

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

    #[test]
    fn update_then_query_round_trips_declarations_and_skeleton() {
        let project = Arc::new(FakeProject {
            files: vec![(PathBuf::from("lib.rs"), "fn add(a: i32, b: i32) -> i32 { a + b }", registry::RUST)],
        });
        let analyzer = Analyzer::new(project);
        let report = analyzer.update(None, &AtomicBool::new(false)).unwrap();
        assert_eq!(report.added, 1);

        let file = analyzer.file_id_for(Path::new("lib.rs")).unwrap();
        let declarations = analyzer.get_declarations(file);
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0].identifier(), "add");

        let skeleton = analyzer.get_skeleton("add").unwrap();
        assert!(skeleton.contains("fn add"));
    }

    #[test]
    fn infer_type_at_resolves_a_two_hop_method_chain() {
        let source = r#"package p;
class Node {
    Leaf getLeaf() { return null; }
}
class Leaf {
    int value;
}
class User {
    void run() {
        Node n = new Node();
        int v = n.getLeaf().value;
    }
}
"#;
        let project = Arc::new(FakeProject {
            files: vec![(PathBuf::from("Node.java"), source, registry::JAVA)],
        });
        let analyzer = Analyzer::new(project);
        analyzer.update(None, &AtomicBool::new(false)).unwrap();

        let file = analyzer.file_id_for(Path::new("Node.java")).unwrap();
        let offset = source.find("value;").unwrap() + 1;
        let resolved = analyzer.infer_type_at(file, offset).unwrap();
        assert_eq!(resolved.fq_name(), "p.Leaf.value");
    }

    #[test]
    fn get_ancestors_breaks_a_cycle_instead_of_hanging() {
        let source = "class A extends B {}\nclass B extends A {}\n";
        let project = Arc::new(FakeProject {
            files: vec![(PathBuf::from("cycle.java"), source, registry::JAVA)],
        });
        let analyzer = Analyzer::new(project);
        analyzer.update(None, &AtomicBool::new(false)).unwrap();

        let a = analyzer.get_definitions("A").into_iter().next().unwrap();
        let ancestors = analyzer.get_ancestors(&a);
        assert_eq!(ancestors.iter().map(|u| u.fq_name()).collect::<HashSet<_>>(), HashSet::from(["B".to_string()]));
    }

    #[test]
    fn cancelled_update_leaves_the_previous_snapshot_untouched() {
        let project = Arc::new(FakeProject {
            files: vec![(PathBuf::from("lib.rs"), "fn add() {}", registry::RUST)],
        });
        let analyzer = Analyzer::new(project);
        let cancelled = AtomicBool::new(true);
        assert!(analyzer.update(None, &cancelled).is_none());
        assert!(analyzer.get_all_declarations().is_empty());
    }
}
