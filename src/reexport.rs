//! Re-export records (TypeScript only, spec §6.4).

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReexportInfo {
    /// The module specifier being forwarded from, e.g. `"./widgets"`.
    pub source: String,
    /// Exported names. Empty for wildcard and namespace re-exports, which
    /// have no specific symbol list (spec §6.4).
    pub symbols: Vec<String>,
    /// original -> exposed name, for `export { X as Y } from`.
    pub renamed: HashMap<String, String>,
    /// The namespace identifier for `export * as N from`.
    pub namespace: Option<String>,
    pub export_all: bool,
}

impl ReexportInfo {
    /// `export * from "source"`
    pub fn wildcard(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            symbols: Vec::new(),
            renamed: HashMap::new(),
            namespace: None,
            export_all: true,
        }
    }

    /// `export { a, b } from "source"`
    pub fn named(source: impl Into<String>, symbols: Vec<String>) -> Self {
        Self {
            source: source.into(),
            symbols,
            renamed: HashMap::new(),
            namespace: None,
            export_all: false,
        }
    }

    /// `export * as N from "source"`
    pub fn namespace(source: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            symbols: Vec::new(),
            renamed: HashMap::new(),
            namespace: Some(namespace.into()),
            export_all: false,
        }
    }

    /// `export { original as exposed, ... } from "source"`
    pub fn renamed(source: impl Into<String>, renamed: HashMap<String, String>) -> Self {
        let symbols = renamed.keys().cloned().collect();
        Self {
            source: source.into(),
            symbols,
            renamed,
            namespace: None,
            export_all: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_and_namespace_have_no_symbols() {
        assert!(ReexportInfo::wildcard("./a").symbols.is_empty());
        assert!(ReexportInfo::namespace("./a", "NS").symbols.is_empty());
    }

    #[test]
    fn renamed_carries_both_the_rename_map_and_original_set() {
        let mut map = HashMap::new();
        map.insert("Foo".to_string(), "Bar".to_string());
        let info = ReexportInfo::renamed("./a", map.clone());
        assert_eq!(info.renamed, map);
        assert_eq!(info.symbols, vec!["Foo".to_string()]);
    }
}
