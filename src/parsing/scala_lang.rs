//! Scala language profile.
//!
//! Classes, traits, and objects behave like Java nesting (`.` everywhere),
//! except `object` declarations get a trailing `$` on their short name to
//! mirror the JVM's own naming of module/companion classes.

use tree_sitter::Node;

use crate::call_receiver::{dotted_prefix, trimmed_or_none};
use crate::code_unit::UnitKind;
use crate::types::{ByteRange, Separators};

use super::common::{leading_comment_range, node_text};
use super::profile::{DuplicatePolicy, LanguageProfile};
use super::registry::{LanguageId, SCALA};

pub struct ScalaProfile;

impl ScalaProfile {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageProfile for ScalaProfile {
    fn id(&self) -> LanguageId {
        SCALA
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["scala", "sc"]
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_scala::LANGUAGE.into()
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
            "class_definition" | "trait_definition" | "object_definition" => Some(UnitKind::Class),
            "function_definition" => Some(UnitKind::Function),
            "val_definition" | "var_definition" => Some(UnitKind::Field),
            "package_object" | "package_clause" => Some(UnitKind::Module),
            _ => None,
        }
    }

    fn simple_name(&self, node: Node, kind: UnitKind, source: &str) -> Option<String> {
        if kind == UnitKind::Field {
            let pattern = node.child_by_field_name("pattern")?;
            return Some(node_text(pattern, source).to_string());
        }
        let name_node = node.child_by_field_name("name")?;
        let name = node_text(name_node, source).to_string();
        if self.is_module_singleton(node) {
            Some(format!("{name}$"))
        } else {
            Some(name)
        }
    }

    fn is_module_singleton(&self, node: Node) -> bool {
        node.kind() == "object_definition"
    }

    fn signature_of(&self, node: Node, kind: UnitKind, source: &str) -> Option<String> {
        if kind != UnitKind::Function {
            return None;
        }
        let params = node.child_by_field_name("parameters")?;
        Some(node_text(params, source).to_string())
    }

    fn doc_comment_range(&self, node: Node, source: &str) -> Option<ByteRange> {
        leading_comment_range(node, source, |kind| kind == "comment" || kind == "block_comment")
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
        // `simple_name` already carries the trailing `$` for `object`
        // declarations, appended in `simple_name()` above.
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

    fn body_placeholder(&self) -> &'static str {
        "{ ... }"
    }

    fn extract_call_receiver(&self, expression: &str) -> Option<String> {
        let trimmed = trimmed_or_none(expression)?;
        dotted_prefix(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_trait_joins_with_dot() {
        let profile = ScalaProfile::new();
        let chain = vec![("Outer".to_string(), UnitKind::Class)];
        let short = profile.format_short_name(&chain, "Inner", UnitKind::Class, None);
        assert_eq!(short, "Outer.Inner");
    }

    #[test]
    fn object_definition_gets_trailing_dollar_simple_name() {
        let profile = ScalaProfile::new();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&profile.ts_language()).unwrap();
        let source = "object Registry { def get(): Int = 1 }";
        let tree = parser.parse(source, None).unwrap();
        let object_node = tree.root_node().child(0).unwrap();
        assert_eq!(profile.simple_name(object_node, UnitKind::Class, source), Some("Registry$".to_string()));
    }
}
