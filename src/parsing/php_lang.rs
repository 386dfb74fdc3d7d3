//! PHP language profile.
//!
//! Call-receiver extraction is the distinctive part here (spec §4.9): a
//! receiver ends immediately before `::` or `->`, variable receivers keep
//! their leading `$`, `self`/`static`/`parent` are valid receivers, and a
//! chained instance call (`$a->b->c`) conservatively returns empty since
//! we can't know the runtime type of the dereferenced result.

use tree_sitter::Node;

use crate::code_unit::UnitKind;
use crate::types::{ByteRange, Separators};

use super::common::{leading_comment_range, node_text};
use super::profile::{DuplicatePolicy, LanguageProfile};
use super::registry::{LanguageId, PHP};

pub struct PhpProfile;

impl PhpProfile {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageProfile for PhpProfile {
    fn id(&self) -> LanguageId {
        PHP
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["php"]
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_php::LANGUAGE_PHP.into()
    }

    fn separators(&self) -> Separators {
        Separators::new("::", "->")
    }

    fn duplicate_policy(&self, kind: UnitKind) -> DuplicatePolicy {
        match kind {
            UnitKind::Function => DuplicatePolicy::PreserveAll,
            _ => DuplicatePolicy::FirstWins,
        }
    }

    fn classify(&self, node: Node) -> Option<UnitKind> {
        match node.kind() {
            "class_declaration" | "interface_declaration" | "trait_declaration" | "enum_declaration" => {
                Some(UnitKind::Class)
            }
            "function_definition" | "method_declaration" => Some(UnitKind::Function),
            "property_declaration" | "const_declaration" => Some(UnitKind::Field),
            "namespace_definition" => Some(UnitKind::Module),
            _ => None,
        }
    }

    fn simple_name(&self, node: Node, kind: UnitKind, source: &str) -> Option<String> {
        match kind {
            UnitKind::Field => {
                let mut cursor = node.walk();
                let element = node
                    .children(&mut cursor)
                    .find(|c| matches!(c.kind(), "property_element" | "const_element"))?;
                let name_node = element.child_by_field_name("name")?;
                Some(node_text(name_node, source).trim_start_matches('$').to_string())
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

    fn derive_package_name(&self, _path: &std::path::Path, source: &str, root: Node) -> String {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "namespace_definition" {
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
        kind: UnitKind,
        _signature: Option<&str>,
    ) -> String {
        if class_chain.is_empty() {
            return simple_name.to_string();
        }
        let joined = class_chain
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join("::");
        let sep = if kind == UnitKind::Class { "::" } else { "->" };
        format!("{joined}{sep}{simple_name}")
    }

    fn imports_of(&self, root: Node, source: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "namespace_use_declaration" {
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
        let body = raw_import.trim_start_matches("use").trim().trim_end_matches(';').trim();
        let first = body.split(',').next()?.trim();
        let first = first.split(" as ").next().unwrap_or(first).trim();
        Some(super::profile::ImportTarget::Named(first.trim_start_matches('\\').to_string()))
    }

    fn body_placeholder(&self) -> &'static str {
        "{ ... }"
    }

    fn extract_call_receiver(&self, expression: &str) -> Option<String> {
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return None;
        }

        let static_pos = trimmed.rfind("::");
        let instance_pos = trimmed.rfind("->");

        match (static_pos, instance_pos) {
            (None, None) => None,
            (Some(pos), None) => extract_before(trimmed, pos),
            (None, Some(pos)) => {
                if trimmed[..pos].contains("->") {
                    // A second `->` further left means this is a chained
                    // instance call; conservatively return nothing.
                    None
                } else {
                    extract_before(trimmed, pos)
                }
            }
            (Some(static_idx), Some(instance_idx)) => {
                if static_idx > instance_idx {
                    extract_before(trimmed, static_idx)
                } else if trimmed[..instance_idx].contains("->") {
                    None
                } else {
                    extract_before(trimmed, instance_idx)
                }
            }
        }
    }
}

fn extract_before(expression: &str, pos: usize) -> Option<String> {
    let receiver = expression[..pos].trim();
    if receiver.is_empty() {
        None
    } else {
        Some(receiver.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_receivers_keep_the_sigil() {
        let profile = PhpProfile::new();
        assert_eq!(profile.extract_call_receiver("$repo->save"), Some("$repo".to_string()));
    }

    #[test]
    fn self_static_parent_are_valid_receivers() {
        let profile = PhpProfile::new();
        assert_eq!(profile.extract_call_receiver("self::create"), Some("self".to_string()));
        assert_eq!(profile.extract_call_receiver("parent::__construct"), Some("parent".to_string()));
        assert_eq!(profile.extract_call_receiver("static::make"), Some("static".to_string()));
    }

    #[test]
    fn chained_instance_call_conservatively_returns_empty() {
        let profile = PhpProfile::new();
        assert_eq!(profile.extract_call_receiver("$this->service->doWork"), None);
    }
}
