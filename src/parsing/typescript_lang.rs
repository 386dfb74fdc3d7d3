//! TypeScript/JavaScript language profile.
//!
//! One struct services both grammars (spec §4.4: "C/C++ and TypeScript/
//! JavaScript each counted once as required language families but kept as
//! distinct... profiles") — `typescript()` and `javascript()` pick the
//! tree-sitter grammar and file extensions, everything else is shared.
//!
//! Two merge behaviors worth flagging up front:
//! - Interface declaration merging: a second `interface` under the same name
//!   in the same file unions its members with the first rather than
//!   overwriting it (spec §8 test scenario 3). There's no special-casing for
//!   this here: `Class`'s `duplicate_policy` is `LastWins`, so the second
//!   declaration replaces the first `CodeUnit`, but `own_key` is computed
//!   from the name chain alone (`ParentKey::from_chain`, independent of
//!   `UnitKind`) — both interface bodies' members land under the same parent
//!   key, so the index's `children_of` lookup already returns their union
//!   without either body's members being dropped.
//! - Function+namespace merging (the same name bound to both a `function`
//!   and a `namespace`): both are kept as distinct `CodeUnit`s, since `kind`
//!   is part of identity (spec I5) and a function is never the same unit as
//!   a namespace. They still share `own_key` for the same name-chain reason
//!   as interfaces above, so the namespace's members show up as the
//!   function's children through `children_of` even though the function and
//!   namespace remain two separate lookups by fqn.

use tree_sitter::Node;

use crate::call_receiver::{is_pascal_case, strip_bracket_access, strip_generics, trimmed_or_none};
use crate::code_unit::UnitKind;
use crate::reexport::ReexportInfo;
use crate::types::{ByteRange, Separators};

use super::common::{leading_comment_range, leading_decorator_ranges, node_text};
use super::profile::{DuplicatePolicy, LanguageProfile};
use super::registry::{LanguageId, JAVASCRIPT, TYPESCRIPT};

pub struct TypeScriptProfile {
    id: LanguageId,
    extensions: &'static [&'static str],
}

impl TypeScriptProfile {
    pub fn typescript() -> Self {
        Self {
            id: TYPESCRIPT,
            extensions: &["ts", "tsx"],
        }
    }

    pub fn javascript() -> Self {
        Self {
            id: JAVASCRIPT,
            extensions: &["js", "jsx", "mjs", "cjs"],
        }
    }
}

impl LanguageProfile for TypeScriptProfile {
    fn id(&self) -> LanguageId {
        self.id
    }

    fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    fn ts_language(&self) -> tree_sitter::Language {
        if self.id == TYPESCRIPT {
            tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
        } else {
            tree_sitter_javascript::LANGUAGE.into()
        }
    }

    fn separators(&self) -> Separators {
        Separators::new(".", ".")
    }

    fn duplicate_policy(&self, kind: UnitKind) -> DuplicatePolicy {
        match kind {
            UnitKind::Function => DuplicatePolicy::PreserveAll,
            _ => DuplicatePolicy::LastWins,
        }
    }

    fn static_overlap_suffix(&self) -> Option<&'static str> {
        Some("$static")
    }

    fn classify(&self, node: Node) -> Option<UnitKind> {
        match node.kind() {
            "class_declaration" | "interface_declaration" => Some(UnitKind::Class),
            "function_declaration" | "method_definition" | "arrow_function" => Some(UnitKind::Function),
            "lexical_declaration" | "variable_declaration" | "public_field_definition" | "property_signature" => {
                Some(UnitKind::Field)
            }
            "module" | "internal_module" => Some(UnitKind::Module),
            _ => None,
        }
    }

    fn should_descend(&self, node: Node) -> bool {
        !matches!(node.kind(), "import_statement")
    }

    fn simple_name(&self, node: Node, kind: UnitKind, source: &str) -> Option<String> {
        match kind {
            UnitKind::Field => {
                if matches!(node.kind(), "public_field_definition" | "property_signature") {
                    let name_node = node.child_by_field_name("name")?;
                    return Some(node_text(name_node, source).to_string());
                }
                let declarator = first_child_of_kind(node, "variable_declarator")?;
                let name_node = declarator.child_by_field_name("name")?;
                Some(node_text(name_node, source).to_string())
            }
            UnitKind::Module => {
                let name_node = node.child_by_field_name("name")?;
                Some(node_text(name_node, source).trim_matches('"').trim_matches('\'').to_string())
            }
            _ => {
                let name_node = node.child_by_field_name("name")?;
                Some(node_text(name_node, source).to_string())
            }
        }
    }

    fn signature_of(&self, node: Node, kind: UnitKind, source: &str) -> Option<String> {
        if kind != UnitKind::Function {
            return None;
        }
        let params = node.child_by_field_name("parameters")?;
        Some(node_text(params, source).to_string())
    }

    fn doc_comment_range(&self, node: Node, source: &str) -> Option<ByteRange> {
        leading_comment_range(node, source, |kind| kind == "comment")
    }

    fn decorator_ranges(&self, node: Node) -> Vec<ByteRange> {
        leading_decorator_ranges(node, |kind| kind == "decorator")
    }

    fn modifiers_of(&self, node: Node, source: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if matches!(child.kind(), "export" | "static" | "abstract" | "readonly" | "private" | "public" | "protected") {
                out.push(node_text(child, source).to_string());
            }
        }
        out
    }

    fn base_types_of(&self, node: Node, source: &str) -> Vec<String> {
        match node.child_by_field_name("heritage") {
            Some(heritage) => vec![node_text(heritage, source).to_string()],
            None => Vec::new(),
        }
    }

    fn derive_package_name(&self, _path: &std::path::Path, source: &str, root: Node) -> String {
        // No explicit package keyword; top-level namespaces (if any) act as
        // the package for their members, otherwise the package is empty and
        // the file acts as its own namespace boundary.
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if matches!(child.kind(), "module" | "internal_module") {
                if let Some(name_node) = child.child_by_field_name("name") {
                    return node_text(name_node, source).trim_matches('"').to_string();
                }
            }
        }
        String::new()
    }

    fn format_short_name(
        &self,
        class_chain: &[(String, UnitKind)],
        simple_name: &str,
        kind: UnitKind,
        _signature: Option<&str>,
    ) -> String {
        if class_chain.is_empty() {
            // Module-scoped constants get a synthetic `_module_.` prefix
            // (spec §4.4) so a file-level `const x` never collides with a
            // same-named class/function short name at the same scope.
            if kind == UnitKind::Field {
                format!("_module_.{simple_name}")
            } else {
                simple_name.to_string()
            }
        } else {
            let joined = class_chain
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join(".");
            format!("{joined}.{simple_name}")
        }
    }

    fn normalize_fqn(&self, raw: &str) -> String {
        strip_generics(raw)
    }

    fn imports_of(&self, root: Node, source: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "import_statement" {
                out.push(node_text(child, source).trim().to_string());
            }
        }
        out
    }

    fn resolve_import(
        &self,
        ctx: &super::profile::ImportContext<'_>,
        raw_import: &str,
    ) -> Option<super::profile::ImportTarget> {
        let (_before, from_clause) = raw_import.rsplit_once("from")?;
        let module_spec = from_clause.trim().trim_matches(';').trim_matches('"').trim_matches('\'');
        let resolved = resolve_relative_specifier(ctx.file_path, module_spec);

        let names_part = raw_import
            .trim_start_matches("import")
            .split("from")
            .next()
            .unwrap_or("")
            .trim();

        if names_part.starts_with('*') {
            return Some(super::profile::ImportTarget::Wildcard(resolved));
        }
        let inner = names_part.trim_start_matches('{').trim_end_matches('}');
        let first = inner.split(',').next()?.trim();
        let first = first.split(" as ").next().unwrap_or(first).trim();
        if first.is_empty() {
            return Some(super::profile::ImportTarget::Wildcard(resolved));
        }
        Some(super::profile::ImportTarget::Named(format!("{resolved}.{first}")))
    }

    fn reexports_of(&self, root: Node, source: &str) -> Vec<ReexportInfo> {
        let mut out = Vec::new();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() != "export_statement" {
                continue;
            }
            let text = node_text(child, source).trim();
            if let Some(info) = parse_reexport(text) {
                out.push(info);
            }
        }
        out
    }

    fn body_placeholder(&self) -> &'static str {
        "{ ... }"
    }

    fn extract_call_receiver(&self, expression: &str) -> Option<String> {
        let trimmed = trimmed_or_none(expression)?;
        let stripped = strip_bracket_access(&strip_generics(trimmed));
        let receiver = {
            let pos = stripped.rfind('.')?;
            if pos == 0 {
                return None;
            }
            stripped[..pos].to_string()
        };
        let last_segment = receiver.rsplit('.').next().unwrap_or(&receiver);
        if is_pascal_case(last_segment) {
            Some(last_segment.to_string())
        } else {
            None
        }
    }
}

fn first_child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

fn resolve_relative_specifier(file_path: &std::path::Path, module_spec: &str) -> String {
    if !module_spec.starts_with('.') {
        return module_spec.to_string();
    }
    let base = file_path.parent().unwrap_or_else(|| std::path::Path::new(""));
    let joined = base.join(module_spec);
    joined.to_string_lossy().replace('\\', "/")
}

/// Parses the textual shape of an `export ... from "..."` statement into a
/// `ReexportInfo` (spec §6.4). Operates on trimmed statement text rather
/// than walking the sub-tree, since the four shapes are easy to distinguish
/// lexically and the grammar's export-clause shape varies across
/// tree-sitter-typescript versions.
fn parse_reexport(text: &str) -> Option<ReexportInfo> {
    let (head, source_part) = text.rsplit_once("from")?;
    let source = source_part.trim().trim_matches(';').trim_matches('"').trim_matches('\'').to_string();
    let head = head.trim_start_matches("export").trim();

    if let Some(namespace) = head.strip_prefix("* as ") {
        return Some(ReexportInfo::namespace(source, namespace.trim().to_string()));
    }
    if head.starts_with('*') {
        return Some(ReexportInfo::wildcard(source));
    }
    if let Some(inner) = head.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        let mut renamed = std::collections::HashMap::new();
        let mut plain = Vec::new();
        for entry in inner.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            if let Some((orig, exposed)) = entry.split_once(" as ") {
                renamed.insert(orig.trim().to_string(), exposed.trim().to_string());
            } else {
                plain.push(entry.to_string());
            }
        }
        if renamed.is_empty() {
            return Some(ReexportInfo::named(source, plain));
        }
        for p in plain {
            renamed.insert(p.clone(), p);
        }
        return Some(ReexportInfo::renamed(source, renamed));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_receiver_selects_last_pascal_case_segment() {
        let profile = TypeScriptProfile::typescript();
        assert_eq!(profile.extract_call_receiver("Array.isArray"), Some("Array".to_string()));
        assert_eq!(profile.extract_call_receiver("console.log"), None);
    }

    #[test]
    fn wildcard_reexport_has_no_symbols() {
        let info = parse_reexport("export * from \"./widgets\";").unwrap();
        assert!(info.export_all);
        assert_eq!(info.source, "./widgets");
    }

    #[test]
    fn namespace_reexport_captures_alias() {
        let info = parse_reexport("export * as Widgets from \"./widgets\";").unwrap();
        assert_eq!(info.namespace, Some("Widgets".to_string()));
    }

    #[test]
    fn renamed_reexport_captures_both_names() {
        let info = parse_reexport("export { Foo as Bar } from \"./widgets\";").unwrap();
        assert_eq!(info.renamed.get("Foo"), Some(&"Bar".to_string()));
    }
}
