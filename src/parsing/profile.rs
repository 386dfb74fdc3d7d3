//! `LanguageProfile`: the single interface discharging per-language
//! polymorphism (spec §4.4 / design note §9 — "runtime dispatch is by static
//! language tag, not by inheritance"). The capture pipeline, skeleton
//! reconstructor, import resolver, and call-receiver extractor all go
//! through this trait; none of them ever match on `LanguageId` directly.

use tree_sitter::Node;

use crate::code_unit::UnitKind;
use crate::types::{ByteRange, Separators};

use super::registry::LanguageId;

/// How a language handles a second declaration under the same key in the
/// same file (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicatePolicy {
    /// The first declaration wins; later ones are dropped.
    FirstWins,
    /// The later declaration replaces the earlier one.
    LastWins,
    /// Every declaration is kept (function overloads, everywhere).
    PreserveAll,
}

/// Context available to an import resolver for one file (spec §4.8).
pub struct ImportContext<'a> {
    pub file_package: &'a str,
    pub file_path: &'a std::path::Path,
}

/// The outcome of resolving one import statement: either a specific
/// simple-name target, or a wildcard marker the caller expands against the
/// index.
#[derive(Debug, Clone)]
pub enum ImportTarget {
    /// A fully- or partially-qualified path to a single symbol.
    Named(String),
    /// Everything exported by a module/namespace.
    Wildcard(String),
}

/// Per-language bundle of grammar, naming rules, and heuristics (spec §4.4,
/// §6.2). One implementation per language; the core traversal and index
/// code is shared (design note §9).
pub trait LanguageProfile: Send + Sync {
    fn id(&self) -> LanguageId;
    fn extensions(&self) -> &'static [&'static str];
    fn ts_language(&self) -> tree_sitter::Language;
    fn separators(&self) -> Separators;
    fn duplicate_policy(&self, kind: UnitKind) -> DuplicatePolicy;

    fn wildcard_imports_supported(&self) -> bool {
        false
    }

    /// TypeScript/C++ static-vs-instance overlap suffix (spec §4.4), e.g.
    /// `"$static"`. `None` for languages without the distinction.
    fn static_overlap_suffix(&self) -> Option<&'static str> {
        None
    }

    /// Classifies a tree-sitter node as introducing a declaration of some
    /// kind, or returns `None` if the node is not itself a declaration
    /// (though it may still need to be walked into).
    fn classify(&self, node: Node) -> Option<UnitKind>;

    /// Whether this node should be walked into for nested declarations even
    /// though `classify` returned `None` for it (e.g. Rust's `impl` block,
    /// a `mod` body, a class body).
    fn should_descend(&self, node: Node) -> bool {
        true
    }

    fn simple_name(&self, node: Node, kind: UnitKind, source: &str) -> Option<String>;

    /// Whether `node` is a module-singleton declaration that should carry
    /// the JVM's trailing `$` on its short name (Scala's `object`). Consulted
    /// by `simple_name` itself, which has the node in hand; `format_short_name`
    /// never needs to ask this question, since by the time it runs the
    /// suffix is already part of the name it was given.
    fn is_module_singleton(&self, node: Node) -> bool {
        let _ = node;
        false
    }
    fn signature_of(&self, node: Node, kind: UnitKind, source: &str) -> Option<String> {
        let _ = (node, kind, source);
        None
    }
    fn doc_comment_range(&self, node: Node, source: &str) -> Option<ByteRange> {
        let _ = (node, source);
        None
    }
    fn decorator_ranges(&self, node: Node) -> Vec<ByteRange> {
        let _ = node;
        Vec::new()
    }
    fn modifiers_of(&self, node: Node, source: &str) -> Vec<String> {
        let _ = (node, source);
        Vec::new()
    }
    fn base_types_of(&self, node: Node, source: &str) -> Vec<String> {
        let _ = (node, source);
        Vec::new()
    }

    /// Declared return type (functions) or declared type (fields), when the
    /// grammar records one syntactically. The type inference engine (spec
    /// §4.10) needs this to chain a call like `n.getLeaf().value` through
    /// `Node.getLeaf(): Leaf`; `None` for languages/declarations without a
    /// static type annotation in that position (inferred-but-unwritten types
    /// are never reconstructed — a documented limitation, not a bug).
    fn type_hint(&self, node: Node, source: &str) -> Option<String> {
        let field = node
            .child_by_field_name("type")
            .or_else(|| node.child_by_field_name("return_type"))?;
        Some(super::common::node_text(field, source).trim().to_string())
    }

    /// Derives `packageName` from the file's own declarations (`package`,
    /// `namespace`, `module`, `__init__.py`, ...).
    fn derive_package_name(&self, path: &std::path::Path, source: &str, root: Node) -> String;

    /// Joins the enclosing class chain and a node's own simple name into
    /// the language's nested `shortName` convention. Each chain entry
    /// carries the `UnitKind` of the declaration that introduced it, since
    /// some languages (Python: `$` to join a class, `.` to join a
    /// function/field) pick the separator per boundary rather than
    /// uniformly. `signature` is the raw parameter-list text when
    /// `kind == Function`, made available because C++'s convention embeds
    /// it directly into `shortName` (spec §4.4: `"add_numbers(int,int)"`)
    /// rather than relying solely on the separate `Signature` field.
    fn format_short_name(
        &self,
        class_chain: &[(String, UnitKind)],
        simple_name: &str,
        kind: UnitKind,
        signature: Option<&str>,
    ) -> String;

    /// Strips generics, location suffixes, and anonymous-class digit
    /// suffixes from a raw FQN (spec §4.4).
    fn normalize_fqn(&self, raw: &str) -> String {
        raw.to_string()
    }

    /// Raw import statement strings found anywhere in the file.
    fn imports_of(&self, root: Node, source: &str) -> Vec<String> {
        let _ = (root, source);
        Vec::new()
    }

    fn resolve_import(&self, ctx: &ImportContext<'_>, raw_import: &str) -> Option<ImportTarget> {
        let _ = (ctx, raw_import);
        None
    }

    fn reexports_of(&self, root: Node, source: &str) -> Vec<crate::reexport::ReexportInfo> {
        let _ = (root, source);
        Vec::new()
    }

    fn body_placeholder(&self) -> &'static str {
        "{...}"
    }
    fn indent_unit(&self) -> &'static str {
        "    "
    }
    fn statement_terminator(&self) -> &'static str {
        ";"
    }

    /// Everything in `node`'s own text up to (but not including) its body,
    /// trimmed of trailing whitespace — the signature line(s) `getSkeleton`
    /// renders a leaf declaration as, with `body_placeholder()` appended.
    /// Looked up once at capture time (the capture pipeline still has the
    /// node in hand) and stored verbatim, since the skeleton reconstructor
    /// never gets the parse tree back (design note §9).
    fn header_text(&self, node: Node, source: &str) -> String {
        match node.child_by_field_name("body") {
            Some(body) => source[node.start_byte()..body.start_byte()].trim_end().to_string(),
            None => super::common::node_text(node, source).trim_end().to_string(),
        }
    }

    /// Whether `kind` introduces a braced/indented body that can hold nested
    /// declarations (CLASS and MODULE always do; FUNCTION only for languages
    /// with function-local classes, i.e. Python).
    fn is_container(&self, kind: UnitKind) -> bool {
        matches!(kind, UnitKind::Class | UnitKind::Module)
    }

    /// Appended to `header_text` when opening a container's body in a
    /// skeleton rendering, e.g. `" {"` for brace languages. Python's header
    /// already ends in `:`, so it overrides this to the empty string.
    fn container_open_suffix(&self) -> &'static str {
        " {"
    }

    /// The line that closes a container's body, or `""` for indentation-only
    /// languages (Python).
    fn container_close(&self) -> &'static str {
        "}"
    }

    /// Heuristic extraction of the receiver of a member-access expression
    /// (spec §4.9), operating over raw text rather than a parse tree.
    fn extract_call_receiver(&self, expression: &str) -> Option<String>;
}
