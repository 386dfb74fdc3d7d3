//! The symbol index: the four maps the spec build around one `CodeUnit`
//! arena (spec §3/§4.1).
//!
//! "Mutable global state becomes immutable snapshots swapped atomically"
//! (design note §9) — `SymbolIndex` itself holds no interior mutability;
//! the update controller (`update.rs`) builds a new one and the analyzer
//! swaps an `Arc` to it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::code_unit::CodeUnit;
use crate::project::ContentHash;
use crate::raw_declaration::ParentKey;
use crate::reexport::ReexportInfo;
use crate::types::{ByteRange, CompactString, FileId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    fn new(index: usize) -> Self {
        Self(index as u32)
    }

    fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Per-file metadata not carried on individual `CodeUnit`s: its raw import
/// strings, the subset that resolved, its re-export records, and the
/// order its top-level declarations appeared in source (spec §4.1:
/// `getTopLevelDeclarations` preserves source order).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileProperties {
    pub imports: Vec<String>,
    pub resolved_imports: Vec<UnitId>,
    pub reexports: Vec<ReexportInfo>,
    pub top_level_order: Vec<UnitId>,
    /// The content hash this file was captured from, so the update
    /// controller (spec §4.11) can tell an unchanged file apart from one
    /// that needs re-capturing without re-parsing it.
    pub content_hash: Option<ContentHash>,
}

/// Everything about one unit that isn't part of its identity (spec I5) but
/// is still needed to answer structural queries: where it sits in its file,
/// its parent/own synthetic keys, and the raw captures that feed
/// `getSkeleton`/`getClassSource`/`getDirectAncestors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitMetadata {
    pub own_key: ParentKey,
    pub parent_key: Option<ParentKey>,
    pub header: CompactString,
    pub declaration_range: ByteRange,
    pub documentation_range: Option<ByteRange>,
    pub modifiers: Vec<CompactString>,
    pub decorators: Vec<ByteRange>,
    pub base_types: Vec<CompactString>,
    pub type_hint: Option<CompactString>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolIndex {
    units: Vec<CodeUnit>,
    metadata: Vec<UnitMetadata>,
    /// Tombstones for units whose file was removed (`remove_file`); their
    /// slots in `units`/`metadata` stay put so earlier `UnitId`s never get
    /// reused, but every lookup filters them out.
    removed: std::collections::HashSet<UnitId>,
    by_fqn: HashMap<String, Vec<UnitId>>,
    by_simple_identifier: HashMap<String, Vec<UnitId>>,
    by_file: HashMap<FileId, Vec<UnitId>>,
    by_parent_key: HashMap<ParentKey, Vec<UnitId>>,
    file_properties: HashMap<FileId, FileProperties>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self {
            units: Vec::new(),
            metadata: Vec::new(),
            removed: std::collections::HashSet::new(),
            by_fqn: HashMap::new(),
            by_simple_identifier: HashMap::new(),
            by_file: HashMap::new(),
            by_parent_key: HashMap::new(),
            file_properties: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.units.len() - self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn unit(&self, id: UnitId) -> Option<&CodeUnit> {
        if self.removed.contains(&id) {
            return None;
        }
        self.units.get(id.index())
    }

    pub fn own_key(&self, id: UnitId) -> Option<&ParentKey> {
        if self.removed.contains(&id) {
            return None;
        }
        self.metadata.get(id.index()).map(|m| &m.own_key)
    }

    pub fn metadata(&self, id: UnitId) -> Option<&UnitMetadata> {
        if self.removed.contains(&id) {
            return None;
        }
        self.metadata.get(id.index())
    }

    pub fn unit_id_for_key(&self, key: &ParentKey) -> Option<UnitId> {
        self.metadata
            .iter()
            .enumerate()
            .find(|(i, m)| &m.own_key == key && !self.removed.contains(&UnitId::new(*i)))
            .map(|(i, _)| UnitId::new(i))
    }

    /// Adds one unit, recording its structural `metadata` for later parent
    /// lookups, `fq_name()`/simple-identifier lookups, and range-based
    /// queries (skeleton, source extraction, ancestors).
    pub fn insert(&mut self, unit: CodeUnit, metadata: UnitMetadata) -> UnitId {
        let id = UnitId::new(self.units.len());
        let fqn = unit.fq_name();
        let identifier = unit.identifier().to_string();
        let file = unit.source;
        let parent_key = metadata.parent_key.clone();

        self.by_fqn.entry(fqn).or_default().push(id);
        self.by_simple_identifier.entry(identifier).or_default().push(id);
        if let Some(file) = file {
            self.by_file.entry(file).or_default().push(id);
        }
        if let Some(parent_key) = parent_key {
            self.by_parent_key.entry(parent_key).or_default().push(id);
        }

        self.units.push(unit);
        self.metadata.push(metadata);
        id
    }

    /// Overwrites an already-inserted unit in place, keeping its `UnitId`
    /// stable while its identity (fqn/simple name) and structural metadata
    /// move to the new values — the "last declaration wins" half of
    /// `DuplicatePolicy::LastWins` (spec §4.4's duplicate-declaration table).
    pub fn replace(&mut self, id: UnitId, unit: CodeUnit, metadata: UnitMetadata) {
        let Some(slot) = self.units.get(id.index()) else { return };
        let old_fqn = slot.fq_name();
        let old_identifier = slot.identifier().to_string();
        let old_parent_key = self.metadata.get(id.index()).and_then(|m| m.parent_key.clone());

        remove_id(&mut self.by_fqn, &old_fqn, id);
        remove_id(&mut self.by_simple_identifier, &old_identifier, id);
        if old_parent_key != metadata.parent_key {
            if let Some(old_parent_key) = old_parent_key {
                if let Some(ids) = self.by_parent_key.get_mut(&old_parent_key) {
                    ids.retain(|existing| *existing != id);
                }
            }
            if let Some(new_parent_key) = metadata.parent_key.clone() {
                self.by_parent_key.entry(new_parent_key).or_default().push(id);
            }
        }

        let new_fqn = unit.fq_name();
        let new_identifier = unit.identifier().to_string();
        self.by_fqn.entry(new_fqn).or_default().push(id);
        self.by_simple_identifier.entry(new_identifier).or_default().push(id);

        self.units[id.index()] = unit;
        self.metadata[id.index()] = metadata;
    }

    pub fn file_properties(&self, file: FileId) -> Option<&FileProperties> {
        self.file_properties.get(&file)
    }

    pub fn set_file_properties(&mut self, file: FileId, properties: FileProperties) {
        self.file_properties.insert(file, properties);
    }

    pub fn by_fqn(&self, fqn: &str) -> &[UnitId] {
        self.by_fqn.get(fqn).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn by_simple_identifier(&self, identifier: &str) -> &[UnitId] {
        self.by_simple_identifier.get(identifier).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn units_in_file(&self, file: FileId) -> &[UnitId] {
        self.by_file.get(&file).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn children_of(&self, parent_key: &ParentKey) -> &[UnitId] {
        self.by_parent_key.get(parent_key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn all_units(&self) -> impl Iterator<Item = (UnitId, &CodeUnit)> {
        self.units
            .iter()
            .enumerate()
            .map(|(i, u)| (UnitId::new(i), u))
            .filter(|(id, _)| !self.removed.contains(id))
    }

    /// Removes every unit belonging to `file` and all index entries that
    /// reference it, used by the update controller before re-inserting a
    /// changed file's fresh declarations. Leaves gaps in `units`'s
    /// contiguous indices as tombstones rather than shifting later ids,
    /// since `UnitId`s must stay stable for any snapshot readers.
    pub fn remove_file(&mut self, file: FileId) {
        let Some(ids) = self.by_file.remove(&file) else {
            return;
        };
        let remove_set: std::collections::HashSet<UnitId> = ids.into_iter().collect();

        retain_ids(&mut self.by_fqn, &remove_set);
        retain_ids(&mut self.by_simple_identifier, &remove_set);
        retain_ids(&mut self.by_parent_key, &remove_set);
        self.file_properties.remove(&file);
        self.removed.extend(remove_set);
    }
}

impl Default for SymbolIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn retain_ids(map: &mut HashMap<String, Vec<UnitId>>, remove: &std::collections::HashSet<UnitId>) {
    map.retain(|_, ids| {
        ids.retain(|id| !remove.contains(id));
        !ids.is_empty()
    });
}

fn remove_id(map: &mut HashMap<String, Vec<UnitId>>, key: &str, id: UnitId) {
    if let Some(ids) = map.get_mut(key) {
        ids.retain(|existing| *existing != id);
        if ids.is_empty() {
            map.remove(key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code_unit::UnitKind;
    use crate::signature::Signature;
    use crate::types::{FileId, Separators};

    fn unit(file: FileId, short_name: &str) -> CodeUnit {
        CodeUnit::new(
            Some(file),
            UnitKind::Class,
            "pkg",
            short_name,
            Signature::None,
            Separators::new(".", "."),
        )
    }

    fn metadata(own_key: ParentKey) -> UnitMetadata {
        UnitMetadata {
            own_key,
            parent_key: None,
            header: "".into(),
            declaration_range: crate::types::ByteRange::new(0, 0),
            documentation_range: None,
            modifiers: Vec::new(),
            decorators: Vec::new(),
            base_types: Vec::new(),
            type_hint: None,
        }
    }

    #[test]
    fn inserted_units_are_findable_by_fqn_and_identifier() {
        let mut index = SymbolIndex::new();
        let file = FileId::new(1).unwrap();
        let key = ParentKey::from_chain(file, &[]);
        let id = index.insert(unit(file, "Widget"), metadata(key));

        assert_eq!(index.by_fqn("pkg.Widget"), &[id]);
        assert_eq!(index.by_simple_identifier("Widget"), &[id]);
        assert_eq!(index.units_in_file(file), &[id]);
    }

    #[test]
    fn removing_a_file_drops_all_its_units_from_every_map() {
        let mut index = SymbolIndex::new();
        let file = FileId::new(1).unwrap();
        let key = ParentKey::from_chain(file, &[]);
        index.insert(unit(file, "Widget"), metadata(key));
        assert_eq!(index.len(), 1);

        index.remove_file(file);
        assert!(index.by_fqn("pkg.Widget").is_empty());
        assert!(index.units_in_file(file).is_empty());
    }
}
