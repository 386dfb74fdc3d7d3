//! The raw declaration record emitted by the capture pipeline (spec §3),
//! before it has been folded into the symbol index.

use crate::code_unit::{CodeUnit, UnitKind};
use crate::index::UnitMetadata;
use crate::parsing::LanguageProfile;
use crate::signature::Signature;
use crate::types::{ByteRange, CompactString, FileId};

/// A synthetic key used to look up a declaration's parent before the
/// symbol index has been fully assembled (spec §3: "parentKey is a
/// pre-resolved synthetic key ... needed to reassemble nested types across
/// captures"). Children carry this instead of an owning reference to their
/// parent, per design note §9 ("cyclic references are avoided").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParentKey(pub CompactString);

impl ParentKey {
    pub fn from_chain(file: FileId, class_chain: &[(CompactString, UnitKind)]) -> Self {
        let joined = class_chain
            .iter()
            .map(|(name, _)| name.as_ref())
            .collect::<Vec<_>>()
            .join("\u{1}");
        ParentKey(format!("{}\u{1}{}", file.value(), joined).into())
    }
}

#[derive(Debug, Clone)]
pub struct RawDeclaration {
    pub file: FileId,
    pub kind: UnitKind,
    pub package_name: CompactString,
    /// Nesting of enclosing classes/functions as seen in source, outermost
    /// first, each paired with the `UnitKind` that introduced it (languages
    /// like Python pick the join separator per boundary, not uniformly).
    /// Does not include this declaration itself.
    pub class_chain: Vec<(CompactString, UnitKind)>,
    pub simple_name: CompactString,
    pub signature: Option<Box<str>>,
    /// This declaration's signature text up to its body, for the skeleton
    /// reconstructor (spec §4.6); computed once here since `skeleton.rs`
    /// never gets the parse tree back.
    pub header: CompactString,
    pub declaration_range: ByteRange,
    pub documentation_range: Option<ByteRange>,
    pub modifiers: Vec<CompactString>,
    pub parent_key: Option<ParentKey>,
    pub decorators: Vec<ByteRange>,
    pub base_types: Vec<CompactString>,
    /// Declared return/field type text, used by type inference (spec §4.10).
    pub type_hint: Option<CompactString>,
    /// This declaration's own synthetic key, so a later sibling can be
    /// addressed as someone's parent.
    pub own_key: ParentKey,
}

impl RawDeclaration {
    /// Folds this capture into the pair the symbol index stores: the
    /// immutable `CodeUnit` identity (spec I5) and the structural metadata
    /// that rides alongside it. `format_short_name` is only ever called
    /// here, once, at index-build time — not in the capture pipeline, which
    /// only records the raw chain.
    pub fn into_unit(self, profile: &dyn LanguageProfile) -> (CodeUnit, UnitMetadata) {
        let string_chain: Vec<(String, UnitKind)> = self
            .class_chain
            .iter()
            .map(|(name, kind)| (name.to_string(), *kind))
            .collect();
        let short_name = profile.format_short_name(&string_chain, &self.simple_name, self.kind, self.signature.as_deref());
        let signature = Signature::parse(self.signature.as_deref()).unwrap_or(Signature::None);

        let unit = CodeUnit::new(
            Some(self.file),
            self.kind,
            self.package_name,
            CompactString::from(short_name),
            signature,
            profile.separators(),
        );
        let metadata = UnitMetadata {
            own_key: self.own_key,
            parent_key: self.parent_key,
            header: self.header,
            declaration_range: self.declaration_range,
            documentation_range: self.documentation_range,
            modifiers: self.modifiers,
            decorators: self.decorators,
            base_types: self.base_types,
            type_hint: self.type_hint,
        };
        (unit, metadata)
    }
}
