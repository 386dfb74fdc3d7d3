//! `CodeUnit`: the immutable identity of one declared symbol (spec §3).

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

use crate::signature::Signature;
use crate::types::{CompactString, FileId, Separators};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitKind {
    Class,
    Function,
    Field,
    Module,
}

/// Identity of one declared symbol.
///
/// Equality and hashing are structural over `(source, kind, package_name,
/// short_name, signature)` only (spec I5) — `separators` is a per-language
/// rendering detail derived from `source`'s language and is deliberately
/// excluded, which is why this type hand-rolls `PartialEq`/`Hash` instead of
/// deriving them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeUnit {
    pub source: Option<FileId>,
    pub kind: UnitKind,
    pub package_name: CompactString,
    pub short_name: CompactString,
    pub signature: Signature,
    pub(crate) separators: Separators,
}

impl CodeUnit {
    pub fn new(
        source: Option<FileId>,
        kind: UnitKind,
        package_name: impl Into<CompactString>,
        short_name: impl Into<CompactString>,
        signature: Signature,
        separators: Separators,
    ) -> Self {
        Self {
            source,
            kind,
            package_name: package_name.into(),
            short_name: short_name.into(),
            signature,
            separators,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, UnitKind::Function)
    }

    pub fn is_class(&self) -> bool {
        matches!(self.kind, UnitKind::Class)
    }

    /// Derived fully-qualified name (spec §3): `packageName + "." +
    /// shortName` unless `packageName` is empty or `shortName` already
    /// contains it, in which case `shortName` is returned verbatim.
    pub fn fq_name(&self) -> String {
        if self.package_name.is_empty() || self.short_name.contains(self.package_name.as_ref()) {
            self.short_name.to_string()
        } else {
            format!("{}.{}", self.package_name, self.short_name)
        }
    }

    /// The substring of `short_name` after the last class- or
    /// member-boundary separator (spec I7).
    pub fn identifier(&self) -> &str {
        let mut cut = 0usize;
        for sep in [self.separators.class_sep, self.separators.member_sep] {
            if sep.is_empty() {
                continue;
            }
            if let Some(pos) = self.short_name.rfind(sep) {
                let end = pos + sep.len();
                if end > cut {
                    cut = end;
                }
            }
        }
        &self.short_name[cut..]
    }

    /// Spec I7: `shortName` for CLASS/MODULE, `identifier()` for
    /// FUNCTION/FIELD.
    pub fn ui_label(&self) -> &str {
        match self.kind {
            UnitKind::Class | UnitKind::Module => &self.short_name,
            UnitKind::Function | UnitKind::Field => self.identifier(),
        }
    }
}

impl PartialEq for CodeUnit {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
            && self.kind == other.kind
            && self.package_name == other.package_name
            && self.short_name == other.short_name
            && self.signature == other.signature
    }
}

impl Eq for CodeUnit {}

impl Hash for CodeUnit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
        self.kind.hash(state);
        self.package_name.hash(state);
        self.short_name.hash(state);
        self.signature.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileId;

    fn sep_java() -> Separators {
        Separators::new(".", ".")
    }

    #[test]
    fn fq_name_joins_package_and_short_name() {
        let unit = CodeUnit::new(
            FileId::new(1),
            UnitKind::Class,
            "com.example",
            "Widget",
            Signature::None,
            sep_java(),
        );
        assert_eq!(unit.fq_name(), "com.example.Widget");
    }

    #[test]
    fn fq_name_is_verbatim_when_package_empty() {
        let unit = CodeUnit::new(
            FileId::new(1),
            UnitKind::Module,
            "",
            "mymodule",
            Signature::None,
            sep_java(),
        );
        assert_eq!(unit.fq_name(), "mymodule");
    }

    #[test]
    fn short_name_is_never_resplit() {
        let unit = CodeUnit::new(
            FileId::new(1),
            UnitKind::Class,
            "pkg",
            "Outer.Inner",
            Signature::None,
            sep_java(),
        );
        assert_eq!(unit.short_name.as_ref(), "Outer.Inner");
        assert_eq!(unit.identifier(), "Inner");
    }

    #[test]
    fn overloads_with_same_fqn_but_different_signature_are_distinct() {
        let a = CodeUnit::new(
            FileId::new(1),
            UnitKind::Function,
            "A",
            "A.method2",
            Signature::parse(Some("(String)")).unwrap(),
            sep_java(),
        );
        let b = CodeUnit::new(
            FileId::new(1),
            UnitKind::Function,
            "A",
            "A.method2",
            Signature::parse(Some("(String,int)")).unwrap(),
            sep_java(),
        );
        assert_ne!(a, b);
        assert_eq!(a.fq_name(), b.fq_name());
    }

    #[test]
    fn ui_label_differs_by_kind() {
        let class = CodeUnit::new(
            FileId::new(1),
            UnitKind::Class,
            "pkg",
            "Outer$Inner",
            Signature::None,
            Separators::new("$", "."),
        );
        assert_eq!(class.ui_label(), "Outer$Inner");

        let function = CodeUnit::new(
            FileId::new(1),
            UnitKind::Function,
            "pkg",
            "Outer$Inner.method",
            Signature::None,
            Separators::new("$", "."),
        );
        assert_eq!(function.ui_label(), "method");
    }
}
