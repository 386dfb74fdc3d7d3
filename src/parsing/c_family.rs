//! C/C++ language profile.
//!
//! `::` separates namespaces and classes in both, but only C++ has them
//! (plain C has neither namespaces nor classes in its grammar). C++'s
//! `shortName` embeds the parameter list directly, e.g.
//! `"add_numbers(int,int)"` (spec §4.4), so `format_short_name` uses the
//! `signature` parameter C doesn't.

use tree_sitter::Node;

use crate::call_receiver::{receiver_before_last, trimmed_or_none};
use crate::code_unit::UnitKind;
use crate::types::{ByteRange, Separators};

use super::common::{leading_comment_range, node_text};
use super::profile::{DuplicatePolicy, LanguageProfile};
use super::registry::{LanguageId, C, CPP};

pub struct CFamilyProfile {
    id: LanguageId,
    extensions: &'static [&'static str],
}

impl CFamilyProfile {
    pub fn c() -> Self {
        Self {
            id: C,
            extensions: &["c", "h"],
        }
    }

    pub fn cpp() -> Self {
        Self {
            id: CPP,
            extensions: &["cpp", "cc", "cxx", "hpp", "hh", "hxx"],
        }
    }

    fn is_cpp(&self) -> bool {
        self.id == CPP
    }
}

impl LanguageProfile for CFamilyProfile {
    fn id(&self) -> LanguageId {
        self.id
    }

    fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    fn ts_language(&self) -> tree_sitter::Language {
        if self.is_cpp() {
            tree_sitter_cpp::LANGUAGE.into()
        } else {
            tree_sitter_c::LANGUAGE.into()
        }
    }

    fn separators(&self) -> Separators {
        Separators::new("::", "::")
    }

    fn duplicate_policy(&self, kind: UnitKind) -> DuplicatePolicy {
        let _ = kind;
        // C/C++ overload resolution by argument types is out of scope
        // (spec Non-goals); the first textual declaration of a name wins.
        DuplicatePolicy::FirstWins
    }

    fn static_overlap_suffix(&self) -> Option<&'static str> {
        if self.is_cpp() {
            Some("$static")
        } else {
            None
        }
    }

    fn classify(&self, node: Node) -> Option<UnitKind> {
        match node.kind() {
            "struct_specifier" | "union_specifier" | "enum_specifier" => Some(UnitKind::Class),
            "class_specifier" if self.is_cpp() => Some(UnitKind::Class),
            "namespace_definition" if self.is_cpp() => Some(UnitKind::Module),
            "function_definition" => Some(UnitKind::Function),
            "declaration" if is_top_level_variable(node) => Some(UnitKind::Field),
            _ => None,
        }
    }

    fn simple_name(&self, node: Node, kind: UnitKind, source: &str) -> Option<String> {
        match kind {
            UnitKind::Function => {
                let declarator = node.child_by_field_name("declarator")?;
                let name_node = innermost_declarator_identifier(declarator)?;
                Some(node_text(name_node, source).to_string())
            }
            UnitKind::Module => {
                let name_node = node.child_by_field_name("name")?;
                Some(node_text(name_node, source).to_string())
            }
            UnitKind::Field => {
                let declarator = node.child_by_field_name("declarator")?;
                let name_node = innermost_declarator_identifier(declarator)?;
                Some(node_text(name_node, source).to_string())
            }
            UnitKind::Class => {
                let name_node = node.child_by_field_name("name")?;
                Some(node_text(name_node, source).to_string())
            }
        }
    }

    fn signature_of(&self, node: Node, kind: UnitKind, source: &str) -> Option<String> {
        if kind != UnitKind::Function {
            return None;
        }
        let declarator = node.child_by_field_name("declarator")?;
        let params = find_parameter_list(declarator)?;
        Some(node_text(params, source).to_string())
    }

    fn doc_comment_range(&self, node: Node, source: &str) -> Option<ByteRange> {
        leading_comment_range(node, source, |kind| kind == "comment")
    }

    fn derive_package_name(&self, _path: &std::path::Path, _source: &str, _root: Node) -> String {
        // Namespaces contribute to the class chain directly (they classify
        // as Module), not to packageName; C/C++ has no file-level package
        // construct comparable to `package`/`namespace` declarations.
        String::new()
    }

    fn format_short_name(
        &self,
        class_chain: &[(String, UnitKind)],
        simple_name: &str,
        kind: UnitKind,
        signature: Option<&str>,
    ) -> String {
        let joined = if class_chain.is_empty() {
            String::new()
        } else {
            class_chain
                .iter()
                .map(|(name, _)| name.as_str())
                .collect::<Vec<_>>()
                .join("::")
        };
        let base = if joined.is_empty() {
            simple_name.to_string()
        } else {
            format!("{joined}::{simple_name}")
        };
        if self.is_cpp() && kind == UnitKind::Function {
            format!("{base}{}", normalize_param_types(signature.unwrap_or("()")))
        } else {
            base
        }
    }

    fn body_placeholder(&self) -> &'static str {
        "{ ... }"
    }

    fn extract_call_receiver(&self, expression: &str) -> Option<String> {
        let trimmed = trimmed_or_none(expression)?;
        // Templated qualified names (`std::vector<int>::size`) are
        // conservatively unsupported (spec §8 test scenario 6).
        if trimmed.contains('<') {
            return None;
        }
        receiver_before_last(trimmed, "::")
    }
}

/// Strips parameter names from a raw `(type name, type name)` parameter
/// list, leaving just the type sequence (spec §4.4: C++'s `shortName`
/// embeds `"(int,int)"`, not the parameter declarations verbatim).
fn normalize_param_types(signature: &str) -> String {
    let inner = signature.trim().trim_start_matches('(').trim_end_matches(')').trim();
    if inner.is_empty() {
        return "()".to_string();
    }
    let types: Vec<String> = inner
        .split(',')
        .map(|param| {
            let param = param.trim();
            match param.rsplit_once(char::is_whitespace) {
                Some((ty, _name)) if !ty.is_empty() => ty.trim().to_string(),
                _ => param.to_string(),
            }
        })
        .collect();
    format!("({})", types.join(","))
}

fn is_top_level_variable(node: Node) -> bool {
    node.parent().map(|p| p.kind() == "translation_unit").unwrap_or(false)
}

fn innermost_declarator_identifier(declarator: Node) -> Option<Node> {
    match declarator.kind() {
        "identifier" | "field_identifier" | "qualified_identifier" | "destructor_name" => Some(declarator),
        _ => {
            if let Some(inner) = declarator.child_by_field_name("declarator") {
                innermost_declarator_identifier(inner)
            } else {
                let mut cursor = declarator.walk();
                declarator
                    .children(&mut cursor)
                    .find(|c| matches!(c.kind(), "identifier" | "field_identifier" | "qualified_identifier"))
            }
        }
    }
}

fn find_parameter_list(declarator: Node) -> Option<Node> {
    if declarator.kind() == "function_declarator" {
        return declarator.child_by_field_name("parameters");
    }
    declarator
        .child_by_field_name("declarator")
        .and_then(find_parameter_list)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpp_short_name_embeds_signature() {
        let profile = CFamilyProfile::cpp();
        let short = profile.format_short_name(&[], "add_numbers", UnitKind::Function, Some("(int a, int b)"));
        assert_eq!(short, "add_numbers(int,int)");
    }

    #[test]
    fn templated_qualified_receiver_is_unsupported() {
        let profile = CFamilyProfile::cpp();
        assert_eq!(profile.extract_call_receiver("std::vector<int>::size"), None);
    }
}
