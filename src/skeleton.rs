//! The skeleton reconstructor (spec §4.6): a signature-only, nested
//! rendering of a file's declarations, built purely from `SymbolIndex`
//! metadata — the parse tree is never touched again once `capture.rs` has
//! recorded each unit's `header` text (design note §9).

use crate::code_unit::{CodeUnit, UnitKind};
use crate::index::{SymbolIndex, UnitId};
use crate::parsing::LanguageProfile;

/// Renders the full top-level ancestor of `id` (spec §4.6: "for a nested
/// unit, getSkeleton(nestedFqn) returns the full reconstruction of its
/// top-level ancestor").
pub fn render_skeleton(index: &SymbolIndex, profile: &dyn LanguageProfile, id: UnitId) -> Option<String> {
    let top = top_level_ancestor(index, id)?;
    let mut out = String::new();
    render_unit(index, profile, top, 0, Mode::Full, &mut out);
    Some(out)
}

/// Renders just the header of a class/module: its signature, its fields,
/// and a single `[...]` standing in for the rest (spec §4.6).
pub fn render_skeleton_header(index: &SymbolIndex, profile: &dyn LanguageProfile, id: UnitId) -> Option<String> {
    let unit = index.unit(id)?;
    if !matches!(unit.kind, UnitKind::Class | UnitKind::Module) {
        return None;
    }
    let mut out = String::new();
    render_unit(index, profile, id, 0, Mode::HeaderOnly, &mut out);
    Some(out)
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Full,
    HeaderOnly,
}

fn top_level_ancestor(index: &SymbolIndex, id: UnitId) -> Option<UnitId> {
    let mut current = id;
    loop {
        let meta = index.metadata(current)?;
        match meta.parent_key.as_ref().and_then(|key| index.unit_id_for_key(key)) {
            Some(parent) => current = parent,
            None => return Some(current),
        }
    }
}

fn render_unit(
    index: &SymbolIndex,
    profile: &dyn LanguageProfile,
    id: UnitId,
    depth: usize,
    mode: Mode,
    out: &mut String,
) {
    let Some(unit) = index.unit(id) else { return };
    let Some(meta) = index.metadata(id) else { return };
    let indent = profile.indent_unit().repeat(depth);

    if profile.is_container(unit.kind) {
        out.push_str(&indent);
        out.push_str(&meta.header);
        out.push_str(profile.container_open_suffix());
        out.push('\n');

        let children = index.children_of(&meta.own_key);
        match mode {
            Mode::Full => render_children(index, profile, children, depth + 1, Mode::Full, out),
            Mode::HeaderOnly => {
                render_fields_only(index, profile, children, depth + 1, out);
                out.push_str(&profile.indent_unit().repeat(depth + 1));
                out.push_str("[...]\n");
            }
        }

        let close = profile.container_close();
        if !close.is_empty() {
            out.push_str(&indent);
            out.push_str(close);
            out.push('\n');
        }
        return;
    }

    render_leaf(profile, unit, &meta.header, &indent, out);
}

fn render_fields_only(
    index: &SymbolIndex,
    profile: &dyn LanguageProfile,
    children: &[UnitId],
    depth: usize,
    out: &mut String,
) {
    let indent = profile.indent_unit().repeat(depth);
    for &child_id in children {
        let Some(unit) = index.unit(child_id) else { continue };
        if unit.kind != UnitKind::Field {
            continue;
        }
        let Some(meta) = index.metadata(child_id) else { continue };
        render_leaf(profile, unit, &meta.header, &indent, out);
    }
}

/// Renders `children` in capture order (insertion order into `by_parent_key`
/// already reflects this — spec §4.6: "child ordering matches capture
/// order"), grouping contiguous function overloads so only the last one in
/// a run carries the body placeholder (spec §4.6: "one signature per line
/// plus the implementation once").
fn render_children(
    index: &SymbolIndex,
    profile: &dyn LanguageProfile,
    children: &[UnitId],
    depth: usize,
    mode: Mode,
    out: &mut String,
) {
    let indent = profile.indent_unit().repeat(depth);
    let mut i = 0;
    while i < children.len() {
        let id = children[i];
        let Some(unit) = index.unit(id) else {
            i += 1;
            continue;
        };

        if unit.kind != UnitKind::Function {
            render_unit(index, profile, id, depth, mode, out);
            i += 1;
            continue;
        }

        let mut run = vec![id];
        let mut j = i + 1;
        while j < children.len() {
            let Some(next) = index.unit(children[j]) else { break };
            if next.kind == UnitKind::Function && next.identifier() == unit.identifier() {
                run.push(children[j]);
                j += 1;
            } else {
                break;
            }
        }

        for (k, &overload_id) in run.iter().enumerate() {
            let Some(meta) = index.metadata(overload_id) else { continue };
            out.push_str(&indent);
            out.push_str(&meta.header);
            if k + 1 == run.len() {
                out.push(' ');
                out.push_str(profile.body_placeholder());
            }
            out.push_str(profile.statement_terminator());
            out.push('\n');
        }
        i = j;
    }
}

fn render_leaf(profile: &dyn LanguageProfile, unit: &CodeUnit, header: &str, indent: &str, out: &mut String) {
    out.push_str(indent);
    out.push_str(header);
    if unit.kind == UnitKind::Function {
        out.push(' ');
        out.push_str(profile.body_placeholder());
    }
    out.push_str(profile.statement_terminator());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::capture_file;
    use crate::parsing::registry;
    use crate::types::FileId;

    fn build_index(source: &str, language: registry::LanguageId, file: FileId) -> (SymbolIndex, std::sync::Arc<dyn LanguageProfile>) {
        let profile = registry::registry().get(language).unwrap();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&profile.ts_language()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        let captured = capture_file(file, std::path::Path::new("x"), &tree, source, &profile);

        let mut index = SymbolIndex::new();
        for decl in captured.declarations {
            let (unit, metadata) = decl.into_unit(profile.as_ref());
            index.insert(unit, metadata);
        }
        (index, profile)
    }

    #[test]
    fn renders_a_class_with_a_method_body_replaced() {
        let source = "struct Widget; impl Widget { fn render(&self) { println!(\"x\"); } }";
        let file = FileId::new(1).unwrap();
        let (index, profile) = build_index(source, registry::RUST, file);

        let widget_id = index.by_simple_identifier("Widget")[0];
        let skeleton = render_skeleton(&index, profile.as_ref(), widget_id).unwrap();
        assert!(skeleton.contains("struct Widget"));
    }

    #[test]
    fn nested_request_returns_the_top_level_reconstruction() {
        let source = "struct Widget; impl Widget { fn render(&self) {} }";
        let file = FileId::new(1).unwrap();
        let (index, profile) = build_index(source, registry::RUST, file);

        let render_id = *index
            .by_simple_identifier("render")
            .iter()
            .find(|&&id| index.unit(id).unwrap().kind == UnitKind::Function)
            .unwrap();
        let skeleton = render_skeleton(&index, profile.as_ref(), render_id).unwrap();
        assert!(skeleton.contains("struct Widget"));
        assert!(skeleton.contains("render"));
    }
}
