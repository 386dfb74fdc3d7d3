//! Tree-walking helpers shared by every `LanguageProfile` implementation.
//!
//! Grounded in the teacher's parser style (direct `node.kind()` matching and
//! `child_by_field_name`, see `parsing/rust.rs`) rather than a literal
//! `.scm` query DSL — the per-language "captures" of spec §4.3 are realized
//! here as node-kind classification plus named-field lookups, which is the
//! idiomatic tree-sitter-in-Rust pattern this lineage actually uses.

use tree_sitter::Node;

use crate::types::ByteRange;

pub fn node_text<'a>(node: Node, source: &'a str) -> &'a str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

pub fn byte_range_of(node: Node) -> ByteRange {
    ByteRange::new(node.start_byte(), node.end_byte())
}

/// Walks backward through `node`'s previous siblings, accumulating a
/// contiguous run of comments recognized by `is_comment_kind`. Per spec
/// §4.7: "only whitespace and at most one blank line may lie between
/// comment end and declaration start".
pub fn leading_comment_range(
    node: Node,
    source: &str,
    is_comment_kind: impl Fn(&str) -> bool,
) -> Option<ByteRange> {
    let mut current = node.prev_sibling()?;
    let mut earliest: Option<Node> = None;
    let mut cursor_end = node.start_byte();

    loop {
        if !is_comment_kind(current.kind()) {
            break;
        }
        if !only_whitespace_and_at_most_one_blank_line(source, current.end_byte(), cursor_end) {
            break;
        }
        earliest = Some(current);
        cursor_end = current.start_byte();
        match current.prev_sibling() {
            Some(prev) => current = prev,
            None => break,
        }
    }

    earliest.map(|n| ByteRange::new(n.start_byte(), node.start_byte()))
}

fn only_whitespace_and_at_most_one_blank_line(source: &str, start: usize, end: usize) -> bool {
    let Some(gap) = source.get(start..end) else {
        return false;
    };
    if !gap.chars().all(|c| c.is_whitespace()) {
        return false;
    }
    gap.bytes().filter(|&b| b == b'\n').count() <= 2
}

/// Collects the byte ranges of a run of decorator/annotation siblings
/// immediately preceding `node` (Python `@decorator`, Java/TS/C#
/// annotations not already grammatical children of the declaration node).
pub fn leading_decorator_ranges(node: Node, is_decorator_kind: impl Fn(&str) -> bool) -> Vec<ByteRange> {
    let mut out = Vec::new();
    let mut current = node.prev_sibling();
    while let Some(n) = current {
        if !is_decorator_kind(n.kind()) {
            break;
        }
        out.push(byte_range_of(n));
        current = n.prev_sibling();
    }
    out.reverse();
    out
}

/// Finds the innermost node whose byte range covers `offset`, used by the
/// type inference engine and `getIdentifierAt` (spec §4.10).
pub fn innermost_node_at(root: Node<'_>, offset: usize) -> Option<Node<'_>> {
    if offset < root.start_byte() || offset > root.end_byte() {
        return None;
    }
    root.descendant_for_byte_range(offset, offset)
        .or(Some(root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_gap_allows_at_most_one_blank_line() {
        assert!(only_whitespace_and_at_most_one_blank_line("a\n\nb", 1, 3));
        assert!(!only_whitespace_and_at_most_one_blank_line("a\n\n\nb", 1, 4));
        assert!(!only_whitespace_and_at_most_one_blank_line("a x b", 1, 4));
    }
}
