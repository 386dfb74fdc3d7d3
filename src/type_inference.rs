//! The type inference engine (spec §4.10): intra-file, one-hop-through-
//! imports resolution of the identifier chain at a byte offset to a
//! declared `CodeUnit`. Best-effort heuristic, not a full type checker
//! (spec's explicit framing) — short-circuits at the first resolution and
//! never guesses between ambiguous candidates.

use std::collections::HashMap;

use tree_sitter::Tree;

use crate::code_unit::UnitKind;
use crate::index::{SymbolIndex, UnitId};
use crate::source_content::SourceContent;
use crate::types::FileId;

/// Scope information gathered for one `(file, offset)` query (spec §4.10
/// step 1): the enclosing class/function and the locally-visible symbols
/// (parameters plus variables assigned before `offset`).
pub struct TypeInferenceContext {
    pub enclosing_class: Option<UnitId>,
    pub enclosing_function: Option<UnitId>,
    /// Local variable/parameter name -> its declared type's simple name.
    pub locals: HashMap<String, String>,
}

pub fn build_context(index: &SymbolIndex, content: &SourceContent, file: FileId, offset: usize) -> TypeInferenceContext {
    let enclosing_function = innermost_unit_of_kind(index, file, offset, UnitKind::Function);
    let enclosing_class = innermost_unit_of_kind(index, file, offset, UnitKind::Class);

    let mut locals = HashMap::new();
    if let Some(function_id) = enclosing_function {
        if let Some(metadata) = index.metadata(function_id) {
            if let Some(unit) = index.unit(function_id) {
                if let Some(sig) = unit.signature.as_str() {
                    collect_parameter_types(sig, &mut locals);
                }
            }
            let range = metadata.declaration_range;
            let body_end = offset.min(range.end);
            if body_end > range.start {
                let body_text = content.substring_from_bytes(range.start, body_end);
                collect_local_declarations(&body_text, &mut locals);
                collect_instanceof_bindings(&body_text, &mut locals);
            }
        }
    }

    TypeInferenceContext {
        enclosing_class,
        enclosing_function,
        locals,
    }
}

fn innermost_unit_of_kind(index: &SymbolIndex, file: FileId, offset: usize, kind: UnitKind) -> Option<UnitId> {
    index
        .units_in_file(file)
        .iter()
        .copied()
        .filter(|&id| index.unit(id).is_some_and(|u| u.kind == kind))
        .filter(|&id| {
            index
                .metadata(id)
                .is_some_and(|m| m.declaration_range.contains_offset(offset))
        })
        .min_by_key(|&id| index.metadata(id).map(|m| m.declaration_range.len()).unwrap_or(usize::MAX))
}

/// Parses a signature literal (`"(Type a, Type b)"`) into `name -> Type`
/// pairs, taking everything before the last whitespace-separated token in
/// each comma-separated parameter as its type. A pragmatic heuristic: it
/// assumes a type-before-name convention (Java/C#/Go/C-family/Scala/Rust's
/// `name: Type` is handled separately since colon-typed params never match
/// this pattern and are simply skipped, not crashed on).
fn collect_parameter_types(signature: &str, out: &mut HashMap<String, String>) {
    let inner = signature.trim().trim_start_matches('(').trim_end_matches(')');
    for param in inner.split(',') {
        let param = param.trim();
        if param.is_empty() {
            continue;
        }
        if let Some((name, ty)) = param.split_once(':') {
            out.insert(name.trim().trim_start_matches('&').to_string(), normalize_type(ty.trim()));
            continue;
        }
        if let Some((ty, name)) = param.rsplit_once(char::is_whitespace) {
            let name = name.trim_start_matches('*').trim_start_matches('&');
            out.insert(name.to_string(), normalize_type(ty.trim()));
        }
    }
}

fn normalize_type(raw: &str) -> String {
    raw.trim_end_matches(|c| c == '[' || c == ']')
        .split(['<', '(']).next()
        .unwrap_or(raw)
        .trim()
        .trim_start_matches("const ")
        .to_string()
}

/// Scans `body_text` for `Type name = new Type(...)` / `Type name = ...;`
/// declarations (spec §4.10 step 1: "scanned by walking the method body for
/// variable-declaration nodes up to offset"). Done over text rather than a
/// sub-tree walk, consistent with this engine's text-first heuristics.
fn collect_local_declarations(body_text: &str, out: &mut HashMap<String, String>) {
    for statement in body_text.split(['\n', ';']) {
        let statement = statement.trim();
        let Some(eq_pos) = statement.find('=') else { continue };
        let (decl, rhs) = statement.split_at(eq_pos);
        let rhs = rhs[1..].trim();
        let decl = decl.trim();

        let Some((ty, name)) = decl.rsplit_once(char::is_whitespace) else { continue };
        let name = name.trim();
        if name.is_empty() || !name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_') {
            continue;
        }

        if let Some(rest) = rhs.strip_prefix("new ") {
            let ctor = rest.split(['(', ' ']).next().unwrap_or(rest);
            out.insert(name.to_string(), normalize_type(ctor));
        } else if !ty.trim().is_empty() && ty.trim().chars().next().is_some_and(|c| c.is_uppercase()) {
            out.insert(name.to_string(), normalize_type(ty));
        }
    }
}

/// Scans for `instanceof T name` pattern variables (spec §4.10 step 2) and
/// binds `name` to `T`, but only while `offset` is still inside at least one
/// more brace level opened since the check (step 3: the binding is scoped to
/// the guarded branch, not the whole enclosing method). Approximated over
/// text with a brace-balance count rather than a real branch-exit analysis,
/// consistent with this engine's other text-first scans.
fn collect_instanceof_bindings(body_text: &str, out: &mut HashMap<String, String>) {
    let mut cursor = 0usize;
    while let Some(rel) = body_text[cursor..].find("instanceof") {
        let kw_start = cursor + rel;
        let after = kw_start + "instanceof".len();
        cursor = after;

        let tail = &body_text[after..];
        let ty_start = tail.find(|c: char| !c.is_whitespace()).unwrap_or(tail.len());
        let ty_tail = &tail[ty_start..];
        let ty_len = ty_tail
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(ty_tail.len());
        let ty = &ty_tail[..ty_len];
        if ty.is_empty() {
            continue;
        }

        let name_region = &ty_tail[ty_len..];
        let name_start = name_region.find(|c: char| !c.is_whitespace()).unwrap_or(name_region.len());
        let name_tail = &name_region[name_start..];
        let name_len = name_tail.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(name_tail.len());
        let name = &name_tail[..name_len];
        if name.is_empty() || !name.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_') {
            continue;
        }

        let remainder = &body_text[after..];
        let opens = remainder.matches('{').count();
        let closes = remainder.matches('}').count();
        if opens > closes {
            out.insert(name.to_string(), normalize_type(ty));
        }
    }
}

/// Finds the longest run of identifier-chain characters covering `offset`:
/// letters, digits, `_`, `.`, `:`, `-`, `>`, `$`, and balanced call
/// parentheses, so a call segment like `getLeaf()` stays part of the chain.
fn chain_range_at(text: &str, offset: usize) -> Option<(usize, usize)> {
    fn is_chain_char(c: char) -> bool {
        c.is_alphanumeric() || matches!(c, '_' | '.' | '(' | ')' | ':' | '-' | '>' | '$')
    }

    let offset = offset.min(text.len());
    let mut start = offset;
    while start > 0 {
        let Some((idx, c)) = text[..start].char_indices().next_back() else { break };
        if is_chain_char(c) {
            start = idx;
        } else {
            break;
        }
    }
    let mut end = offset;
    while end < text.len() {
        let Some(c) = text[end..].chars().next() else { break };
        if is_chain_char(c) {
            end += c.len_utf8();
        } else {
            break;
        }
    }
    if start >= end {
        None
    } else {
        Some((start, end))
    }
}

/// Whether the chain at `(start, end)` is immediately preceded by the `new`
/// keyword (`new Node()`), which resolves the first segment directly to a
/// class rather than through local/parameter/field lookup.
fn preceded_by_new(text: &str, start: usize) -> bool {
    text[..start].trim_end().ends_with("new")
}

pub fn get_identifier_at(content: &SourceContent, offset: usize) -> Option<String> {
    let (start, end) = chain_range_at(content.text(), offset)?;
    Some(content.text()[start..end].to_string())
}

/// `inferTypeAt` (spec §4.10). `tree`/`content` must be the current parse
/// for `file` (the caller resolves these through the parse cache); this
/// engine only reads byte offsets and the already-built `SymbolIndex`, never
/// walking sub-trees of its own.
pub fn infer_type_at(index: &SymbolIndex, content: &SourceContent, _tree: &Tree, file: FileId, offset: usize) -> Option<UnitId> {
    let text = content.text();
    let (start, end) = chain_range_at(text, offset)?;
    let chain_text = &text[start..end];
    let segments: Vec<&str> = chain_text.split('.').filter(|s| !s.is_empty()).collect();
    let first = segments.first()?;

    let context = build_context(index, content, file, offset);
    let is_new = preceded_by_new(text, start);

    let (mut owner_type, mut resolved): (Option<String>, Option<UnitId>) = if is_new {
        let ctor = first.split('(').next().unwrap_or(first);
        let class_id = resolve_class_by_name(index, ctor);
        (Some(ctor.to_string()), class_id)
    } else {
        resolve_head(index, &context, first)
    };

    for raw_segment in segments.iter().skip(1) {
        let name = raw_segment.split('(').next().unwrap_or(raw_segment);
        let Some(ty) = owner_type.clone() else { return resolved };
        let Some(class_id) = resolve_class_by_name(index, &ty) else {
            return resolved;
        };
        let member = resolve_member(index, class_id, name);
        match member {
            Some(member_id) => {
                resolved = Some(member_id);
                owner_type = index
                    .metadata(member_id)
                    .and_then(|m| m.type_hint.as_deref())
                    .map(|t| normalize_type(t));
            }
            None => return resolved,
        }
    }

    resolved
}

fn resolve_head(index: &SymbolIndex, context: &TypeInferenceContext, name: &str) -> (Option<String>, Option<UnitId>) {
    if name == "this" || name == "self" {
        return (context.enclosing_class.and_then(|id| index.unit(id)).map(|u| u.identifier().to_string()), context.enclosing_class);
    }
    if name == "super" || name == "parent" {
        let base = context
            .enclosing_class
            .and_then(|id| index.metadata(id))
            .and_then(|m| m.base_types.first())
            .map(|t| t.to_string());
        let class_id = base.as_deref().and_then(|b| resolve_class_by_name(index, b));
        return (base, class_id);
    }
    if let Some(ty) = context.locals.get(name) {
        let class_id = resolve_class_by_name(index, ty);
        return (Some(ty.clone()), class_id);
    }
    // Current class's own fields (including inherited, spec §4.5's parent
    // chain), then same-file top-level symbols, then resolved imports.
    if let Some(class_id) = context.enclosing_class {
        if let Some(field_id) = resolve_member(index, class_id, name) {
            let ty = index
                .metadata(field_id)
                .and_then(|m| m.type_hint.as_deref())
                .map(normalize_type);
            return (ty, Some(field_id));
        }
    }
    if let Some(class_id) = resolve_class_by_name(index, name) {
        return (Some(name.to_string()), Some(class_id));
    }
    (None, None)
}

fn resolve_class_by_name(index: &SymbolIndex, name: &str) -> Option<UnitId> {
    index
        .by_simple_identifier(name)
        .iter()
        .copied()
        .find(|&id| index.unit(id).is_some_and(|u| u.kind == UnitKind::Class))
}

/// A class's own direct children plus, one level at a time, its ancestors'
/// children (spec §4.5/§4.10: "using the class's direct children then its
/// ancestors' children").
fn resolve_member(index: &SymbolIndex, class_id: UnitId, name: &str) -> Option<UnitId> {
    let own_key = index.metadata(class_id)?.own_key.clone();
    if let Some(found) = index
        .children_of(&own_key)
        .iter()
        .copied()
        .find(|&id| index.unit(id).is_some_and(|u| u.identifier() == name))
    {
        return Some(found);
    }

    let mut seen = std::collections::HashSet::new();
    seen.insert(class_id);
    let mut frontier: Vec<UnitId> = index
        .metadata(class_id)?
        .base_types
        .iter()
        .filter_map(|base| resolve_class_by_name(index, base))
        .collect();

    while let Some(ancestor_id) = frontier.pop() {
        if !seen.insert(ancestor_id) {
            continue;
        }
        let Some(ancestor_key) = index.metadata(ancestor_id).map(|m| m.own_key.clone()) else { continue };
        if let Some(found) = index
            .children_of(&ancestor_key)
            .iter()
            .copied()
            .find(|&id| index.unit(id).is_some_and(|u| u.identifier() == name))
        {
            return Some(found);
        }
        if let Some(bases) = index.metadata(ancestor_id).map(|m| m.base_types.clone()) {
            frontier.extend(bases.iter().filter_map(|b| resolve_class_by_name(index, b)));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::capture_file;
    use crate::parsing::registry;
    use std::path::Path;

    fn build_index(source: &str, language: registry::LanguageId) -> (SymbolIndex, SourceContent) {
        let profile = registry::registry().get(language).unwrap();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&profile.ts_language()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        let file = FileId::new(1).unwrap();
        let captured = capture_file(file, Path::new("p/Node.java"), &tree, source, &profile);

        let mut index = SymbolIndex::new();
        for decl in captured.declarations {
            let (unit, metadata) = decl.into_unit(profile.as_ref());
            index.insert(unit, metadata);
        }
        (index, SourceContent::new(source.as_bytes()))
    }

    #[test]
    fn resolves_a_two_hop_method_chain_through_return_types() {
        let source = r#"
package p;
class Node {
    Leaf getLeaf() { return null; }
}
class Leaf {
    int value;
}
class User {
    void run() {
        Node n = new Node();
        int v = n.getLeaf().value;
    }
}
"#;
        let (index, content) = build_index(source, registry::JAVA);
        let offset = source.find("value;").unwrap() + 1;
        let file = FileId::new(1).unwrap();

        let mut parser = tree_sitter::Parser::new();
        let profile = registry::registry().get(registry::JAVA).unwrap();
        parser.set_language(&profile.ts_language()).unwrap();
        let tree = parser.parse(source, None).unwrap();

        let resolved = infer_type_at(&index, &content, &tree, file, offset);
        let unit = resolved.and_then(|id| index.unit(id));
        assert!(unit.is_some());
        assert_eq!(unit.unwrap().fq_name(), "p.Leaf.value");
    }

    #[test]
    fn identifier_at_returns_the_longest_covering_chain() {
        let content = SourceContent::new(b"n.getLeaf().value");
        let chain = get_identifier_at(&content, 10);
        assert_eq!(chain.as_deref(), Some("n.getLeaf().value"));
    }

    #[test]
    fn instanceof_pattern_variable_resolves_inside_the_guarded_branch() {
        let source = r#"
package p;
class Leaf {
    int value;
}
class User {
    void run(Object o) {
        if (o instanceof Leaf leaf) {
            int v = leaf.value;
        }
    }
}
"#;
        let (index, content) = build_index(source, registry::JAVA);
        let offset = source.find("leaf.value").unwrap() + "leaf.value".len() - 1;
        let file = FileId::new(1).unwrap();

        let mut parser = tree_sitter::Parser::new();
        let profile = registry::registry().get(registry::JAVA).unwrap();
        parser.set_language(&profile.ts_language()).unwrap();
        let tree = parser.parse(source, None).unwrap();

        let resolved = infer_type_at(&index, &content, &tree, file, offset);
        let unit = resolved.and_then(|id| index.unit(id));
        assert_eq!(unit.map(|u| u.fq_name()), Some("p.Leaf.value".to_string()));
    }

    #[test]
    fn instanceof_binding_is_not_visible_after_the_guarded_branch_closes() {
        let mut locals = HashMap::new();
        let body = "if (o instanceof Leaf leaf) { int v = leaf.value; } int w = 1;";
        collect_instanceof_bindings(body, &mut locals);
        assert!(locals.is_empty());
    }
}
