//! Shared helpers for call-receiver extraction (spec §4.9).
//!
//! Each language profile supplies `extract_call_receiver`; the primitives
//! here are the "one compiled rule table per language" design note (§9)
//! applied to the common cases (longest-dotted-prefix, last-`::`-segment,
//! PascalCase gating) so no profile reimplements string-splitting by hand.

/// Returns `None` for empty/whitespace-only input, `Some(trimmed)` otherwise.
pub fn trimmed_or_none(expression: &str) -> Option<&str> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// The text before the last occurrence of `separator`, or `None` if the
/// separator is absent or the receiver would be empty.
pub fn receiver_before_last(expression: &str, separator: &str) -> Option<String> {
    let trimmed = trimmed_or_none(expression)?;
    let pos = trimmed.rfind(separator)?;
    if pos == 0 {
        return None;
    }
    Some(trimmed[..pos].to_string())
}

pub fn is_uppercase_ascii_start(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

pub fn is_pascal_case(s: &str) -> bool {
    is_uppercase_ascii_start(s) && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Java/Scala/Python/Go rule: the receiver is the longest dotted prefix
/// before the last `.`. Callers apply the Java-specific uppercase gate
/// themselves since Python/Go don't require it.
pub fn dotted_prefix(expression: &str) -> Option<String> {
    receiver_before_last(expression, ".")
}

/// Strips generic type arguments (`<...>`) from consideration by removing
/// the first top-level `<...>` span, used by the JS/TS and C# extractors.
pub fn strip_generics(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut depth = 0i32;
    for c in expression.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = (depth - 1).max(0),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

/// Strips bracketed property access (`[...]`) the same way `strip_generics`
/// strips angle brackets, for the JS/TS extractor.
pub fn strip_bracket_access(expression: &str) -> String {
    let mut out = String::with_capacity(expression.len());
    let mut depth = 0i32;
    for c in expression.chars() {
        match c {
            '[' => depth += 1,
            ']' => depth = (depth - 1).max(0),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_or_none_rejects_blank_input() {
        assert_eq!(trimmed_or_none("   "), None);
        assert_eq!(trimmed_or_none(""), None);
        assert_eq!(trimmed_or_none(" x "), Some("x"));
    }

    #[test]
    fn receiver_before_last_requires_a_nonempty_prefix() {
        assert_eq!(receiver_before_last("a.b.c", "."), Some("a.b".to_string()));
        assert_eq!(receiver_before_last(".foo", "."), None);
        assert_eq!(receiver_before_last("foo", "."), None);
    }

    #[test]
    fn strip_generics_removes_angle_bracket_spans() {
        assert_eq!(strip_generics("std::vector<int>::size"), "std::vector::size");
    }
}
