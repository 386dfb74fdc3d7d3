//! The capture pipeline (spec §4.3): walks one file's parse tree, classifies
//! each node via its `LanguageProfile`, and assembles `RawDeclaration`s.
//!
//! Realized as direct node-kind classification plus named-field lookups
//! (see `parsing::common`) rather than a literal tree-sitter `.scm` query
//! DSL, matching the teacher's own parser style.

use std::path::Path;
use std::sync::Arc;

use tree_sitter::{Node, Tree};

use crate::code_unit::UnitKind;
use crate::error::{log_diagnostic, Diagnostic};
use crate::parsing::LanguageProfile;
use crate::raw_declaration::{ParentKey, RawDeclaration};
use crate::signature::Signature;
use crate::types::{compact_string, CompactString, FileId};

/// Everything one capture pass produces for a single file.
pub struct CaptureResult {
    pub declarations: Vec<RawDeclaration>,
    pub imports: Vec<String>,
    pub reexports: Vec<crate::reexport::ReexportInfo>,
}

/// Walks `tree` top-down, descending into every node the profile says to,
/// and emitting one `RawDeclaration` per node the profile classifies.
pub fn capture_file(
    file: FileId,
    path: &Path,
    tree: &Tree,
    source: &str,
    profile: &Arc<dyn LanguageProfile>,
) -> CaptureResult {
    let package_name = compact_string(profile.derive_package_name(path, source, tree.root_node()));
    let mut declarations = Vec::new();
    let mut chain: Vec<(CompactString, UnitKind)> = Vec::new();

    walk(
        tree.root_node(),
        file,
        source,
        profile.as_ref(),
        &package_name,
        &mut chain,
        None,
        &mut declarations,
    );

    apply_static_overlap_suffix(&mut declarations, profile.as_ref());

    let imports = profile.imports_of(tree.root_node(), source);
    let reexports = profile.reexports_of(tree.root_node(), source);

    CaptureResult {
        declarations,
        imports,
        reexports,
    }
}

#[allow(clippy::too_many_arguments)]
fn walk(
    node: Node,
    file: FileId,
    source: &str,
    profile: &dyn LanguageProfile,
    package_name: &CompactString,
    chain: &mut Vec<(CompactString, UnitKind)>,
    parent_key: Option<&ParentKey>,
    out: &mut Vec<RawDeclaration>,
) {
    let kind = profile.classify(node);

    if let Some(kind) = kind {
        match build_declaration(node, file, source, profile, package_name, chain, parent_key, kind) {
            Some(decl) => {
                let own_key = decl.own_key.clone();
                let simple_chain_name = compact_string(decl.simple_name.as_ref());

                out.push(decl);

                chain.push((simple_chain_name, kind));
                descend_children(node, file, source, profile, package_name, chain, Some(&own_key), out);
                chain.pop();
            }
            None => {
                log_diagnostic(&Diagnostic::QueryCaptureError {
                    file,
                    reason: format!("node kind '{}' classified as {:?} but had no extractable name", node.kind(), kind),
                });
                descend_children(node, file, source, profile, package_name, chain, parent_key, out);
            }
        }
        return;
    }

    if profile.should_descend(node) {
        descend_children(node, file, source, profile, package_name, chain, parent_key, out);
    }
}

#[allow(clippy::too_many_arguments)]
fn descend_children(
    node: Node,
    file: FileId,
    source: &str,
    profile: &dyn LanguageProfile,
    package_name: &CompactString,
    chain: &mut Vec<(CompactString, UnitKind)>,
    parent_key: Option<&ParentKey>,
    out: &mut Vec<RawDeclaration>,
) {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, file, source, profile, package_name, chain, parent_key, out);
    }
}

#[allow(clippy::too_many_arguments)]
fn build_declaration(
    node: Node,
    file: FileId,
    source: &str,
    profile: &dyn LanguageProfile,
    package_name: &CompactString,
    chain: &[(CompactString, UnitKind)],
    parent_key: Option<&ParentKey>,
    kind: UnitKind,
) -> Option<RawDeclaration> {
    let simple_name = profile.simple_name(node, kind, source)?;
    let signature_text = profile.signature_of(node, kind, source);
    let signature = match Signature::parse(signature_text.as_deref()) {
        Ok(sig) => sig,
        Err(err) => {
            log_diagnostic(&Diagnostic::QueryCaptureError {
                file,
                reason: err.to_string(),
            });
            Signature::None
        }
    };

    let own_key = ParentKey::from_chain(file, &append(chain, compact_string(&simple_name), kind));
    let header = compact_string(profile.header_text(node, source));
    let type_hint = matches!(kind, UnitKind::Function | UnitKind::Field)
        .then(|| profile.type_hint(node, source))
        .flatten()
        .map(compact_string);

    Some(RawDeclaration {
        file,
        kind,
        package_name: package_name.clone(),
        class_chain: chain.to_vec(),
        simple_name: compact_string(simple_name),
        signature: signature.as_str().map(|s| s.into()),
        header,
        declaration_range: crate::parsing::common::byte_range_of(node),
        documentation_range: profile.doc_comment_range(node, source),
        modifiers: profile.modifiers_of(node, source).into_iter().map(compact_string).collect(),
        parent_key: parent_key.cloned(),
        decorators: profile.decorator_ranges(node),
        base_types: profile.base_types_of(node, source).into_iter().map(compact_string).collect(),
        type_hint,
        own_key,
    })
}

fn append(
    chain: &[(CompactString, UnitKind)],
    name: CompactString,
    kind: UnitKind,
) -> Vec<(CompactString, UnitKind)> {
    let mut out = chain.to_vec();
    out.push((name, kind));
    out
}

/// Renames a static member that collides with an instance member of the
/// same name under the same parent (spec §4.4: the `$static` suffix) and
/// re-derives its `own_key`, re-pointing any of its own children's
/// `parent_key` to match.
fn apply_static_overlap_suffix(declarations: &mut [RawDeclaration], profile: &dyn LanguageProfile) {
    let Some(suffix) = profile.static_overlap_suffix() else {
        return;
    };

    let mut groups: std::collections::HashMap<(Option<ParentKey>, CompactString), Vec<usize>> = std::collections::HashMap::new();
    for (i, decl) in declarations.iter().enumerate() {
        groups.entry((decl.parent_key.clone(), decl.simple_name.clone())).or_default().push(i);
    }

    let is_static = |decl: &RawDeclaration| decl.modifiers.iter().any(|m| m.as_ref() == "static");

    let mut renames: Vec<(usize, ParentKey, CompactString)> = Vec::new();
    for indices in groups.values() {
        if indices.len() < 2 {
            continue;
        }
        let has_static = indices.iter().any(|&i| is_static(&declarations[i]));
        let has_instance = indices.iter().any(|&i| !is_static(&declarations[i]));
        if !(has_static && has_instance) {
            continue;
        }
        for &i in indices {
            if is_static(&declarations[i]) {
                let new_simple = compact_string(format!("{}{}", declarations[i].simple_name, suffix));
                let new_own_key =
                    ParentKey::from_chain(declarations[i].file, &append(&declarations[i].class_chain, new_simple.clone(), declarations[i].kind));
                renames.push((i, new_own_key, new_simple));
            }
        }
    }

    if renames.is_empty() {
        return;
    }

    let old_to_new: std::collections::HashMap<ParentKey, ParentKey> =
        renames.iter().map(|(i, new_key, _)| (declarations[*i].own_key.clone(), new_key.clone())).collect();

    for (i, new_key, new_simple) in renames {
        declarations[i].own_key = new_key;
        declarations[i].simple_name = new_simple;
    }

    for decl in declarations.iter_mut() {
        if let Some(pk) = &decl.parent_key {
            if let Some(new_pk) = old_to_new.get(pk) {
                decl.parent_key = Some(new_pk.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::registry;

    #[test]
    fn captures_a_top_level_rust_function() {
        let profile = registry::registry().get(registry::RUST).unwrap();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&profile.ts_language()).unwrap();
        let source = "fn add(a: i32, b: i32) -> i32 { a + b }";
        let tree = parser.parse(source, None).unwrap();
        let file = FileId::new(1).unwrap();

        let result = capture_file(file, Path::new("lib.rs"), &tree, source, &profile);
        assert_eq!(result.declarations.len(), 1);
        assert_eq!(result.declarations[0].simple_name.as_ref(), "add");
        assert_eq!(result.declarations[0].kind, UnitKind::Function);
    }

    #[test]
    fn static_field_colliding_with_an_instance_field_gets_the_dollar_suffix() {
        let profile = registry::registry().get(registry::TYPESCRIPT).unwrap();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&profile.ts_language()).unwrap();
        let source = "class Counter { static count: number = 0; count: number = 0; }";
        let tree = parser.parse(source, None).unwrap();
        let file = FileId::new(1).unwrap();

        let result = capture_file(file, Path::new("counter.ts"), &tree, source, &profile);
        let names: Vec<&str> = result.declarations.iter().map(|d| d.simple_name.as_ref()).collect();
        assert!(names.contains(&"count$static"));
        assert!(names.contains(&"count"));
    }

    #[test]
    fn captures_nested_impl_methods_with_parent_chain() {
        let profile = registry::registry().get(registry::RUST).unwrap();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&profile.ts_language()).unwrap();
        let source = "struct Widget; impl Widget { fn render(&self) {} }";
        let tree = parser.parse(source, None).unwrap();
        let file = FileId::new(1).unwrap();

        let result = capture_file(file, Path::new("lib.rs"), &tree, source, &profile);
        let names: Vec<&str> = result.declarations.iter().map(|d| d.simple_name.as_ref()).collect();
        assert!(names.contains(&"Widget"));
        assert!(names.contains(&"render"));
    }
}
