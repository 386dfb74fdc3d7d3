//! Java language profile.
//!
//! Everything nests with `.` — inner classes, methods, fields alike (spec
//! §4.4). Overloads are preserved by signature; classes/fields/modules use
//! first-wins since a well-formed Java file never redeclares a type.

use tree_sitter::Node;

use crate::call_receiver::{dotted_prefix, is_uppercase_ascii_start, trimmed_or_none};
use crate::code_unit::UnitKind;
use crate::types::{ByteRange, Separators};

use super::common::{leading_comment_range, leading_decorator_ranges, node_text};
use super::profile::{DuplicatePolicy, LanguageProfile};
use super::registry::{LanguageId, JAVA};

pub struct JavaProfile;

impl JavaProfile {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageProfile for JavaProfile {
    fn id(&self) -> LanguageId {
        JAVA
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_java::LANGUAGE.into()
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
            "class_declaration" | "interface_declaration" | "enum_declaration" | "record_declaration" => {
                Some(UnitKind::Class)
            }
            "method_declaration" | "constructor_declaration" => Some(UnitKind::Function),
            "field_declaration" => Some(UnitKind::Field),
            _ => None,
        }
    }

    fn simple_name(&self, node: Node, kind: UnitKind, source: &str) -> Option<String> {
        if kind == UnitKind::Field {
            let declarator = find_child_kind(node, "variable_declarator")?;
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
        leading_comment_range(node, source, |kind| kind == "line_comment" || kind == "block_comment")
    }

    fn decorator_ranges(&self, node: Node) -> Vec<ByteRange> {
        leading_decorator_ranges(node, |kind| kind == "marker_annotation" || kind == "annotation")
    }

    fn modifiers_of(&self, node: Node, source: &str) -> Vec<String> {
        let Some(modifiers_node) = node.child_by_field_name("modifiers") else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut cursor = modifiers_node.walk();
        for child in modifiers_node.children(&mut cursor) {
            if matches!(
                child.kind(),
                "public" | "private" | "protected" | "static" | "final" | "abstract"
            ) {
                out.push(node_text(child, source).to_string());
            }
        }
        out
    }

    fn base_types_of(&self, node: Node, source: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(superclass) = node.child_by_field_name("superclass") {
            out.push(node_text(superclass, source).trim_start_matches("extends").trim().to_string());
        }
        if let Some(interfaces) = node.child_by_field_name("interfaces") {
            out.push(node_text(interfaces, source).trim_start_matches("implements").trim().to_string());
        }
        out
    }

    fn derive_package_name(&self, _path: &std::path::Path, source: &str, root: Node) -> String {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "package_declaration" {
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

    fn imports_of(&self, root: Node, source: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "import_declaration" {
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
        let body = raw_import
            .trim_start_matches("import")
            .trim_start_matches("static")
            .trim()
            .trim_end_matches(';')
            .trim();
        if let Some(prefix) = body.strip_suffix(".*") {
            Some(super::profile::ImportTarget::Wildcard(prefix.to_string()))
        } else {
            Some(super::profile::ImportTarget::Named(body.to_string()))
        }
    }

    fn body_placeholder(&self) -> &'static str {
        "{ ... }"
    }

    fn extract_call_receiver(&self, expression: &str) -> Option<String> {
        let trimmed = trimmed_or_none(expression)?;
        let receiver = dotted_prefix(trimmed)?;
        // Java additionally requires the receiver's first segment to start
        // with an uppercase ASCII letter, so `myVar.foo` is not mistaken for
        // a static call (spec §4.9/§8 test scenario 6).
        let first_segment = receiver.split('.').next().unwrap_or(&receiver);
        if is_uppercase_ascii_start(first_segment) {
            Some(receiver)
        } else {
            None
        }
    }
}

fn find_child_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_class_joins_with_dot() {
        let profile = JavaProfile::new();
        let chain = vec![("Outer".to_string(), UnitKind::Class)];
        let short = profile.format_short_name(&chain, "Inner", UnitKind::Class, None);
        assert_eq!(short, "Outer.Inner");
    }

    #[test]
    fn call_receiver_requires_uppercase_first_segment() {
        let profile = JavaProfile::new();
        assert_eq!(
            profile.extract_call_receiver("GitRepo.sanitizeBranchName(...)"),
            Some("GitRepo".to_string())
        );
        assert_eq!(profile.extract_call_receiver("myVar.foo"), None);
    }

    #[test]
    fn wildcard_import_is_detected() {
        let profile = JavaProfile::new();
        let ctx = super::super::profile::ImportContext {
            file_package: "com.example",
            file_path: std::path::Path::new("A.java"),
        };
        match profile.resolve_import(&ctx, "import java.util.*;") {
            Some(super::super::profile::ImportTarget::Wildcard(prefix)) => {
                assert_eq!(prefix, "java.util")
            }
            other => panic!("expected wildcard, got {other:?}"),
        }
    }
}
