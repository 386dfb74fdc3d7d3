//! C# language profile.
//!
//! `.` joins everywhere, namespace-aware like Java but with PascalCase
//! convention enforced more strictly at the call-receiver layer: both the
//! receiver and the member name must be PascalCase (spec §4.9), and
//! generics are stripped before matching.

use tree_sitter::Node;

use crate::call_receiver::{is_pascal_case, strip_generics, trimmed_or_none};
use crate::code_unit::UnitKind;
use crate::types::{ByteRange, Separators};

use super::common::{leading_comment_range, leading_decorator_ranges, node_text};
use super::profile::{DuplicatePolicy, LanguageProfile};
use super::registry::{LanguageId, CSHARP};

pub struct CSharpProfile;

impl CSharpProfile {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageProfile for CSharpProfile {
    fn id(&self) -> LanguageId {
        CSHARP
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["cs"]
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_c_sharp::LANGUAGE.into()
    }

    fn separators(&self) -> Separators {
        Separators::new(".", ".")
    }

    fn duplicate_policy(&self, kind: UnitKind) -> DuplicatePolicy {
        match kind {
            UnitKind::Function => DuplicatePolicy::PreserveAll,
            _ => DuplicatePolicy::FirstWins,
        }
    }

    fn classify(&self, node: Node) -> Option<UnitKind> {
        match node.kind() {
            "class_declaration" | "interface_declaration" | "struct_declaration" | "enum_declaration" | "record_declaration" => {
                Some(UnitKind::Class)
            }
            "method_declaration" | "constructor_declaration" => Some(UnitKind::Function),
            "field_declaration" | "property_declaration" => Some(UnitKind::Field),
            "namespace_declaration" | "file_scoped_namespace_declaration" => Some(UnitKind::Module),
            _ => None,
        }
    }

    fn simple_name(&self, node: Node, kind: UnitKind, source: &str) -> Option<String> {
        if kind == UnitKind::Field && node.kind() == "field_declaration" {
            let declaration = node.child_by_field_name("declaration")?;
            let declarator = first_child_of_kind(declaration, "variable_declarator")?;
            let name_node = declarator.child_by_field_name("name")?;
            return Some(node_text(name_node, source).to_string());
        }
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
        leading_comment_range(node, source, |kind| kind == "comment")
    }

    fn decorator_ranges(&self, node: Node) -> Vec<ByteRange> {
        leading_decorator_ranges(node, |kind| kind == "attribute_list")
    }

    fn modifiers_of(&self, node: Node, source: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.kind() == "modifier" {
                out.push(node_text(child, source).to_string());
            }
        }
        out
    }

    fn base_types_of(&self, node: Node, source: &str) -> Vec<String> {
        match node.child_by_field_name("bases") {
            Some(bases) => vec![node_text(bases, source).to_string()],
            None => Vec::new(),
        }
    }

    fn derive_package_name(&self, _path: &std::path::Path, source: &str, root: Node) -> String {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if matches!(child.kind(), "namespace_declaration" | "file_scoped_namespace_declaration") {
                if let Some(name_node) = child.child_by_field_name("name") {
                    return node_text(name_node, source).to_string();
                }
            }
        }
        String::new()
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
            if child.kind() == "using_directive" {
                out.push(node_text(child, source).trim().to_string());
            }
        }
        out
    }

    fn resolve_import(
        &self,
        _ctx: &super::profile::ImportContext<'_>,
        raw_import: &str,
    ) -> Option<super::profile::ImportTarget> {
        let body = raw_import.trim_start_matches("using").trim().trim_end_matches(';').trim();
        Some(super::profile::ImportTarget::Named(body.to_string()))
    }

    fn body_placeholder(&self) -> &'static str {
        "{ ... }"
    }

    fn extract_call_receiver(&self, expression: &str) -> Option<String> {
        let trimmed = trimmed_or_none(expression)?;
        let stripped = strip_generics(trimmed);
        let pos = stripped.rfind('.')?;
        if pos == 0 {
            return None;
        }
        let receiver = &stripped[..pos];
        let member = &stripped[pos + 1..];
        let last_segment = receiver.rsplit('.').next().unwrap_or(receiver);
        if is_pascal_case(last_segment) && is_pascal_case(member) {
            Some(receiver.to_string())
        } else {
            None
        }
    }
}

fn first_child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_receiver_and_member_must_be_pascal_case() {
        let profile = CSharpProfile::new();
        assert_eq!(profile.extract_call_receiver("Console.WriteLine"), Some("Console".to_string()));
        assert_eq!(profile.extract_call_receiver("console.WriteLine"), None);
        assert_eq!(profile.extract_call_receiver("Console.writeLine"), None);
    }
}
