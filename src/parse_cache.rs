//! Per-file parse cache (spec §4.2): a `DashMap`-backed store of the
//! parsed tree and `SourceContent` for every known file, keyed by content
//! hash so an unchanged file is never re-parsed across an `update`.
//!
//! "Parse tree lifetime is bounded by the parse cache; callers never see
//! parse nodes directly" (design note §9) — everything downstream of this
//! module only ever calls back into it for the duration of one capture
//! pass, then works from `CodeUnit`s and text.

use std::sync::Arc;

use dashmap::DashMap;
use tree_sitter::Tree;

use crate::parsing::LanguageProfile;
use crate::project::ContentHash;
use crate::source_content::SourceContent;
use crate::types::FileId;

struct CachedParse {
    hash: ContentHash,
    tree: Tree,
    content: SourceContent,
}

/// Single-writer-many-readers: one thread parses a given file at a time
/// (the update controller fans files out across a `rayon` pool, but never
/// two workers on the *same* file), while readers freely look up any
/// already-cached entry concurrently.
pub struct ParseCache {
    entries: DashMap<FileId, CachedParse>,
}

impl ParseCache {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Returns the cached tree/content for `file` if its hash still
    /// matches, otherwise parses `raw` fresh and replaces the entry.
    pub fn get_or_parse(
        &self,
        file: FileId,
        raw: &[u8],
        hash: ContentHash,
        profile: &Arc<dyn LanguageProfile>,
    ) -> (Tree, SourceContent) {
        if let Some(cached) = self.entries.get(&file) {
            if cached.hash == hash {
                return (cached.tree.clone(), cached.content.clone());
            }
        }

        let content = SourceContent::new(raw);
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&profile.ts_language())
            .expect("grammar language configured by the registry is always valid");
        let tree = parser.parse(content.text(), None).unwrap_or_else(|| {
            // tree-sitter only returns `None` on parser misconfiguration
            // (timeout/cancellation callback), neither of which this crate
            // sets up; an empty tree keeps the caller total.
            let mut fallback = tree_sitter::Parser::new();
            fallback.set_language(&profile.ts_language()).unwrap();
            fallback.parse("", None).expect("empty source always parses")
        });

        self.entries.insert(
            file,
            CachedParse {
                hash,
                tree: tree.clone(),
                content: content.clone(),
            },
        );
        (tree, content)
    }

    pub fn invalidate(&self, file: FileId) {
        self.entries.remove(&file);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ParseCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::registry;

    #[test]
    fn unchanged_hash_reuses_the_cached_tree_without_reparsing() {
        let cache = ParseCache::new();
        let profile = registry::registry().get(registry::RUST).unwrap();
        let file = FileId::new(1).unwrap();
        let hash = crate::project::hash_bytes(b"fn main() {}");

        let (tree1, _) = cache.get_or_parse(file, b"fn main() {}", hash, &profile);
        let (tree2, _) = cache.get_or_parse(file, b"fn main() {}", hash, &profile);
        assert_eq!(tree1.root_node().to_sexp(), tree2.root_node().to_sexp());
        assert_eq!(cache.len(), 1);
    }
}
