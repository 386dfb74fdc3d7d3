//! The source extractor (spec §4.7): byte-accurate text of a declaration,
//! optionally widened to include contiguous leading comments/decorators, and
//! overload concatenation for `getMethodSource`.

use crate::index::UnitMetadata;
use crate::parsing::LanguageProfile;
use crate::source_content::SourceContent;
use crate::types::ByteRange;

/// The exact text of one declaration (spec: `SourceContent.substringFromBytes
/// (declStart, declEnd)`), optionally widened backward to the start of its
/// leading documentation/decorators when they're contiguous with it.
pub fn extract_source(content: &SourceContent, metadata: &UnitMetadata, include_leading_comments: bool) -> String {
    let range = extraction_range(metadata, include_leading_comments);
    content.substring_from_bytes(range.start, range.end)
}

fn extraction_range(metadata: &UnitMetadata, include_leading_comments: bool) -> ByteRange {
    let mut start = metadata.declaration_range.start;
    if include_leading_comments {
        if let Some(doc) = metadata.documentation_range {
            start = start.min(doc.start);
        }
        if let Some(first_decorator) = metadata.decorators.first() {
            start = start.min(first_decorator.start);
        }
    }
    ByteRange::new(start, metadata.declaration_range.end)
}

/// `getMethodSource`: concatenates every overload's signature (its `header`,
/// since overloads share a name and differ only by signature) except the
/// last, then the last overload's full implementation text, joined by the
/// language's statement terminator (spec §4.7).
///
/// `overloads` must already be in the order they should render in (capture
/// order, per spec §4.6's ordering contract, which this function shares).
pub fn extract_method_source(
    content: &SourceContent,
    profile: &dyn LanguageProfile,
    overloads: &[&UnitMetadata],
    include_leading_comments: bool,
) -> String {
    let Some((last, rest)) = overloads.split_last() else {
        return String::new();
    };

    let mut parts: Vec<String> = rest.iter().map(|m| m.header.to_string()).collect();
    parts.push(extract_source(content, last, include_leading_comments));
    parts.join(profile.statement_terminator())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::capture_file;
    use crate::code_unit::UnitKind;
    use crate::index::SymbolIndex;
    use crate::parsing::registry;
    use crate::types::FileId;
    use std::path::Path;

    fn index_of(source: &str) -> (SymbolIndex, std::sync::Arc<dyn LanguageProfile>, SourceContent) {
        let profile = registry::registry().get(registry::RUST).unwrap();
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&profile.ts_language()).unwrap();
        let tree = parser.parse(source, None).unwrap();
        let file = FileId::new(1).unwrap();
        let captured = capture_file(file, Path::new("lib.rs"), &tree, source, &profile);

        let mut index = SymbolIndex::new();
        for decl in captured.declarations {
            let (unit, metadata) = decl.into_unit(profile.as_ref());
            index.insert(unit, metadata);
        }
        (index, profile, SourceContent::new(source.as_bytes()))
    }

    #[test]
    fn extracts_the_exact_declaration_text() {
        let source = "fn add(a: i32, b: i32) -> i32 { a + b }";
        let (index, _profile, content) = index_of(source);
        let id = index.by_simple_identifier("add")[0];
        let metadata = index.metadata(id).unwrap();

        let extracted = extract_source(&content, metadata, false);
        assert_eq!(extracted, source);
    }

    #[test]
    fn leading_doc_comment_is_included_when_requested() {
        let source = "/// does the thing\nfn add(a: i32) -> i32 { a }";
        let (index, _profile, content) = index_of(source);
        let id = index.by_simple_identifier("add")[0];
        let metadata = index.metadata(id).unwrap();

        assert!(metadata.documentation_range.is_some());
        let with_doc = extract_source(&content, metadata, true);
        assert!(with_doc.starts_with("/// does the thing"));

        let without_doc = extract_source(&content, metadata, false);
        assert!(!without_doc.contains("does the thing"));
    }

    #[test]
    fn overload_group_keeps_only_the_last_implementation() {
        let source = "fn add(a: i32) -> i32 { a }\nfn add(a: i32, b: i32) -> i32 { a + b }";
        let (index, profile, content) = index_of(source);
        let mut ids: Vec<_> = index
            .by_simple_identifier("add")
            .iter()
            .copied()
            .filter(|&id| index.unit(id).unwrap().kind == UnitKind::Function)
            .collect();
        ids.sort_by_key(|&id| index.metadata(id).unwrap().declaration_range.start);
        let metas: Vec<&UnitMetadata> = ids.iter().map(|&id| index.metadata(id).unwrap()).collect();

        let joined = extract_method_source(&content, profile.as_ref(), &metas, false);
        assert_eq!(joined.matches('{').count(), 1);
        assert!(joined.contains("a + b"));
    }
}
