//! Rust language profile.

use tree_sitter::Node;

use crate::call_receiver::{receiver_before_last, trimmed_or_none};
use crate::code_unit::UnitKind;
use crate::types::{ByteRange, Separators};

use super::common::{byte_range_of, leading_comment_range, node_text};
use super::profile::{DuplicatePolicy, LanguageProfile};
use super::registry::{LanguageId, RUST};

pub struct RustProfile;

impl RustProfile {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageProfile for RustProfile {
    fn id(&self) -> LanguageId {
        RUST
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["rs"]
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_rust::LANGUAGE.into()
    }

    fn separators(&self) -> Separators {
        Separators::new("::", "::")
    }

    fn duplicate_policy(&self, kind: UnitKind) -> DuplicatePolicy {
        match kind {
            UnitKind::Function => DuplicatePolicy::PreserveAll,
            _ => DuplicatePolicy::FirstWins,
        }
    }

    fn classify(&self, node: Node) -> Option<UnitKind> {
        match node.kind() {
            "struct_item" | "enum_item" | "trait_item" | "union_item" => Some(UnitKind::Class),
            "function_item" => Some(UnitKind::Function),
            "const_item" | "static_item" => Some(UnitKind::Field),
            "mod_item" => Some(UnitKind::Module),
            _ => None,
        }
    }

    fn should_descend(&self, node: Node) -> bool {
        // `impl` blocks are not declarations themselves but their methods
        // nest under the implementing type's name.
        !matches!(node.kind(), "attribute_item" | "use_declaration")
    }

    fn simple_name(&self, node: Node, _kind: UnitKind, source: &str) -> Option<String> {
        let name_node = node.child_by_field_name("name")?;
        Some(node_text(name_node, source).to_string())
    }

    fn signature_of(&self, node: Node, kind: UnitKind, source: &str) -> Option<String> {
        if kind != UnitKind::Function {
            return None;
        }
        let params = node.child_by_field_name("parameters")?;
        Some(node_text(params, source).to_string())
    }

    fn doc_comment_range(&self, node: Node, source: &str) -> Option<ByteRange> {
        leading_comment_range(node, source, |kind| kind == "line_comment" || kind == "block_comment")
    }

    fn modifiers_of(&self, node: Node, source: &str) -> Vec<String> {
        let mut modifiers = Vec::new();
        if let Some(vis) = node.child_by_field_name("visibility_modifier") {
            modifiers.push(node_text(vis, source).to_string());
        }
        modifiers
    }

    fn base_types_of(&self, _node: Node, _source: &str) -> Vec<String> {
        // `impl Trait for Type` is handled as an inheritance edge in the
        // update controller's relation pass, not as a field on the struct
        // declaration itself.
        Vec::new()
    }

    fn derive_package_name(&self, path: &std::path::Path, _source: &str, _root: Node) -> String {
        // Rust's module path is filesystem-derived (`crate::a::b` for
        // `src/a/b.rs`); the crate root segment is intentionally omitted
        // since cross-crate FQNs are out of scope (spec Non-goals).
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let parent = path
            .parent()
            .map(|p| {
                p.components()
                    .filter_map(|c| c.as_os_str().to_str())
                    .collect::<Vec<_>>()
                    .join("::")
            })
            .unwrap_or_default();
        if stem == "mod" || stem == "lib" || stem == "main" {
            parent
        } else if parent.is_empty() {
            stem.to_string()
        } else {
            format!("{parent}::{stem}")
        }
    }

    fn format_short_name(
        &self,
        class_chain: &[(String, UnitKind)],
        simple_name: &str,
        _kind: UnitKind,
        _signature: Option<&str>,
    ) -> String {
        if class_chain.is_empty() {
            simple_name.to_string()
        } else {
            let joined = class_chain
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join("::");
            format!("{joined}::{simple_name}")
        }
    }

    fn normalize_fqn(&self, raw: &str) -> String {
        strip_generics_suffix(raw)
    }

    fn imports_of(&self, root: Node, source: &str) -> Vec<String> {
        let mut out = Vec::new();
        collect_use_declarations(root, source, &mut out);
        out
    }

    fn resolve_import(
        &self,
        _ctx: &super::profile::ImportContext<'_>,
        raw_import: &str,
    ) -> Option<super::profile::ImportTarget> {
        if raw_import.ends_with("::*") {
            Some(super::profile::ImportTarget::Wildcard(
                raw_import.trim_end_matches("::*").to_string(),
            ))
        } else {
            Some(super::profile::ImportTarget::Named(raw_import.to_string()))
        }
    }

    fn body_placeholder(&self) -> &'static str {
        "{ ... }"
    }

    fn extract_call_receiver(&self, expression: &str) -> Option<String> {
        let trimmed = trimmed_or_none(expression)?;
        receiver_before_last(trimmed, "::")
    }
}

fn strip_generics_suffix(raw: &str) -> String {
    match raw.find('<') {
        Some(idx) => raw[..idx].to_string(),
        None => raw.to_string(),
    }
}

fn collect_use_declarations(node: Node, source: &str, out: &mut Vec<String>) {
    if node.kind() == "use_declaration" {
        out.push(node_text(node, source).trim().to_string());
        return;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_use_declarations(child, source, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_name_from_nested_path() {
        let profile = RustProfile::new();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&profile.ts_language()).unwrap();
        let tree = parser.parse("fn main() {}", None).unwrap();
        let name = profile.derive_package_name(
            std::path::Path::new("src/parsing/rust.rs"),
            "fn main() {}",
            tree.root_node(),
        );
        assert_eq!(name, "src::parsing::rust");
    }

    #[test]
    fn call_receiver_splits_on_last_double_colon() {
        let profile = RustProfile::new();
        assert_eq!(profile.extract_call_receiver("a::b::c"), Some("a::b".to_string()));
        assert_eq!(profile.extract_call_receiver("  "), None);
    }
}
