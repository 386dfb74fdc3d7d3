//! `Signature`: a tagged value representing a function's parameter list.
//!
//! See spec §3. A function's overloads are only distinguishable by
//! signature, so this type must support structural equality and hashing.

use serde::{Deserialize, Serialize};

use crate::error::{AnalyzerError, AnalyzerResult};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signature {
    /// The shared "no signature recorded" sentinel. Used for CLASS, FIELD,
    /// and MODULE units, and for functions whose parameter list could not be
    /// captured.
    None,
    /// A non-empty string starting with `(` and ending with `)`, e.g.
    /// `"(int, int)"` or `"(s: String, n: int)"`.
    Parameters(Box<str>),
}

impl Signature {
    pub const fn none() -> Self {
        Signature::None
    }

    /// Parses a signature literal. `None`/empty input yields `Signature::None`;
    /// anything else must be wrapped in parentheses or this is a contract
    /// violation (spec §3) reported as `AnalyzerError::MalformedSignature`.
    pub fn parse(input: Option<&str>) -> AnalyzerResult<Self> {
        match input {
            None => Ok(Signature::None),
            Some(s) if s.is_empty() => Ok(Signature::None),
            Some(s) => {
                if s.len() >= 2 && s.starts_with('(') && s.ends_with(')') {
                    Ok(Signature::Parameters(s.into()))
                } else {
                    Err(AnalyzerError::MalformedSignature {
                        input: s.to_string(),
                    })
                }
            }
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Signature::None)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Signature::None => None,
            Signature::Parameters(s) => Some(s),
        }
    }
}

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signature::None => Ok(()),
            Signature::Parameters(s) => write!(f, "{s}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_and_empty_both_parse_to_none() {
        assert_eq!(Signature::parse(None).unwrap(), Signature::None);
        assert_eq!(Signature::parse(Some("")).unwrap(), Signature::None);
    }

    #[test]
    fn well_formed_parameters_parse() {
        let sig = Signature::parse(Some("(int,int)")).unwrap();
        assert_eq!(sig.as_str(), Some("(int,int)"));
    }

    #[test]
    fn malformed_signature_is_a_construction_error() {
        assert!(Signature::parse(Some("int,int")).is_err());
        assert!(Signature::parse(Some("(int,int")).is_err());
        assert!(Signature::parse(Some("int,int)")).is_err());
        assert!(Signature::parse(Some("(")).is_err());
    }

    #[test]
    fn distinct_signatures_are_distinct_for_overload_preservation() {
        let a = Signature::parse(Some("(String)")).unwrap();
        let b = Signature::parse(Some("(String,int)")).unwrap();
        assert_ne!(a, b);
    }
}
