//! Go language profile.
//!
//! Go has no classes; a method's receiver type stands in for the enclosing
//! class in the chain (the grammar attaches `method_declaration` directly
//! to the package block, with the receiver type as a separate field, not
//! as lexical nesting). Package name comes from the file's own `package`
//! clause, not the directory layout, since Go packages are declared rather
//! than implied by folder name.

use tree_sitter::Node;

use crate::call_receiver::{dotted_prefix, trimmed_or_none};
use crate::code_unit::UnitKind;
use crate::types::{ByteRange, Separators};

use super::common::{leading_comment_range, node_text};
use super::profile::{DuplicatePolicy, LanguageProfile};
use super::registry::{LanguageId, GO};

pub struct GoProfile;

impl GoProfile {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageProfile for GoProfile {
    fn id(&self) -> LanguageId {
        GO
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["go"]
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_go::LANGUAGE.into()
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
            "type_declaration" => Some(UnitKind::Class),
            "function_declaration" | "method_declaration" => Some(UnitKind::Function),
            "const_declaration" | "var_declaration" => Some(UnitKind::Field),
            _ => None,
        }
    }

    fn simple_name(&self, node: Node, kind: UnitKind, source: &str) -> Option<String> {
        match kind {
            UnitKind::Class => {
                let spec = first_child_of_kind(node, "type_spec")?;
                let name_node = spec.child_by_field_name("name")?;
                Some(node_text(name_node, source).to_string())
            }
            UnitKind::Field => {
                let spec = first_child_of_kind(node, "const_spec").or_else(|| first_child_of_kind(node, "var_spec"))?;
                let name_node = spec.child_by_field_name("name")?;
                Some(node_text(name_node, source).to_string())
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

    /// Go's receiver type stands in for the enclosing class name in the
    /// chain (spec §4.4's nesting rule applied to Go's method-receiver
    /// syntax instead of lexical class bodies).
    fn base_types_of(&self, node: Node, source: &str) -> Vec<String> {
        if node.kind() != "method_declaration" {
            return Vec::new();
        }
        let Some(receiver) = node.child_by_field_name("receiver") else {
            return Vec::new();
        };
        receiver_type_name(receiver, source).into_iter().collect()
    }

    fn derive_package_name(&self, _path: &std::path::Path, source: &str, root: Node) -> String {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "package_clause" {
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
            .trim()
            .trim_start_matches('(')
            .trim_end_matches(')')
            .trim()
            .trim_matches('"');
        Some(super::profile::ImportTarget::Named(body.to_string()))
    }

    fn body_placeholder(&self) -> &'static str {
        "{ ... }"
    }

    fn extract_call_receiver(&self, expression: &str) -> Option<String> {
        let trimmed = trimmed_or_none(expression)?;
        dotted_prefix(trimmed)
    }
}

fn first_child_of_kind<'a>(node: Node<'a>, kind: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).find(|c| c.kind() == kind)
}

fn receiver_type_name(receiver: Node, source: &str) -> Option<String> {
    let mut cursor = receiver.walk();
    for param in receiver.children(&mut cursor) {
        if param.kind() == "parameter_declaration" {
            if let Some(ty) = param.child_by_field_name("type") {
                let text = node_text(ty, source).trim_start_matches('*');
                return Some(text.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_receiver_is_dotted_prefix_without_case_gate() {
        let profile = GoProfile::new();
        assert_eq!(profile.extract_call_receiver("fmt.Println"), Some("fmt".to_string()));
        assert_eq!(profile.extract_call_receiver("lowercase.call"), Some("lowercase".to_string()));
    }
}
