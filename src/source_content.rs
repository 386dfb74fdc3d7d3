//! `SourceContent`: UTF-8-safe holder of one file's text (spec §3).
//!
//! Tree-sitter reports node ranges as byte offsets into the exact bytes it
//! parsed. Because Rust strings are themselves UTF-8, those byte offsets
//! line up directly with `str` indexing — the hard part is never slicing on
//! a non-boundary, and never panicking on an out-of-range or inverted
//! request (spec I4). This mirrors the `safe_truncate_str` /
//! `safe_substring_window` discipline used elsewhere in this lineage for the
//! same reason (see `parsing::safe_truncate_str`).

use serde::{Deserialize, Serialize};

use crate::types::CharPosition;

const BOM: char = '\u{FEFF}';

/// One file's decoded text plus precomputed line-start offsets for
/// byte↔position mapping. Immutable once constructed; a new `SourceContent`
/// is built whenever a file's content hash changes (spec: "created once per
/// (file, contentHash)").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceContent {
    text: String,
    /// Byte offset of the first byte of each line, `line_starts[0] == 0`.
    line_starts: Vec<usize>,
}

impl SourceContent {
    /// Decodes `raw` as UTF-8 (lossily, to stay infallible for the rare
    /// malformed-encoding file — spec leaves this undocumented, so we take
    /// the permissive reading rather than surfacing a hard error for what
    /// is, for the purposes of indexing, still "a file with some text in
    /// it") and strips a leading BOM (spec I1).
    pub fn new(raw: &[u8]) -> Self {
        let decoded = String::from_utf8_lossy(raw).into_owned();
        let text = match decoded.strip_prefix(BOM) {
            Some(rest) => rest.to_string(),
            None => decoded,
        };
        let line_starts = compute_line_starts(&text);
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Spec I2: equals the UTF-8 length of `text`.
    pub fn byte_length(&self) -> usize {
        self.text.len()
    }

    /// Spec I4: returns the decoding of bytes `[clamp(s,0,len),
    /// clamp(e,s,len))`, snapped inward to the nearest character boundaries,
    /// and the empty string for any inverted or out-of-range request.
    pub fn substring_from_bytes(&self, start: usize, end: usize) -> String {
        let len = self.text.len();
        let start = start.min(len);
        let end = end.max(start).min(len);
        if end <= start {
            return String::new();
        }

        let mut lo = start;
        while lo < end && !self.text.is_char_boundary(lo) {
            lo += 1;
        }
        let mut hi = end;
        while hi > lo && !self.text.is_char_boundary(hi) {
            hi -= 1;
        }
        if hi <= lo {
            return String::new();
        }
        self.text[lo..hi].to_string()
    }

    /// Spec I3: monotone non-decreasing, mutually inverse with
    /// `char_position_to_byte_offset` at character boundaries.
    pub fn byte_offset_to_char_position(&self, offset: usize) -> CharPosition {
        let offset = offset.min(self.text.len());
        let line_idx = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let line_start = self.line_starts[line_idx];
        let mut boundary = offset;
        while boundary > line_start && !self.text.is_char_boundary(boundary) {
            boundary -= 1;
        }
        let column = self.text[line_start..boundary].chars().count() as u32;
        CharPosition {
            line: line_idx as u32,
            column,
        }
    }

    pub fn char_position_to_byte_offset(&self, pos: CharPosition) -> usize {
        let line_idx = (pos.line as usize).min(self.line_starts.len().saturating_sub(1));
        let line_start = self.line_starts[line_idx];
        let line_end = self
            .line_starts
            .get(line_idx + 1)
            .copied()
            .unwrap_or(self.text.len());
        let mut offset = line_start;
        for (count, (byte_idx, _)) in self.text[line_start..line_end].char_indices().enumerate() {
            if count as u32 == pos.column {
                offset = line_start + byte_idx;
                return offset;
            }
        }
        line_end
    }
}

fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut starts = vec![0usize];
    for (idx, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            starts.push(idx + 1);
        }
    }
    starts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_byte_and_char_offsets_coincide() {
        let content = SourceContent::new(b"hello world");
        for offset in 0..=content.byte_length() {
            let pos = content.byte_offset_to_char_position(offset);
            assert_eq!(pos.line, 0);
            assert_eq!(pos.column as usize, offset);
            assert_eq!(content.char_position_to_byte_offset(pos), offset);
        }
    }

    #[test]
    fn bom_is_stripped_and_byte_length_matches() {
        let mut raw = "\u{FEFF}".as_bytes().to_vec();
        raw.extend_from_slice("fn main() {}".as_bytes());
        let content = SourceContent::new(&raw);
        assert!(!content.text().starts_with('\u{FEFF}'));
        assert_eq!(content.byte_length(), "fn main() {}".len());
    }

    #[test]
    fn substring_from_bytes_handles_multibyte_text() {
        let text = "/* ═════ Helpers ═════ */\npublic class Foo {\n}\n";
        let content = SourceContent::new(text.as_bytes());
        let class_start = text.find("public class").unwrap();
        let class_end = text.rfind('}').unwrap() + 1;
        let extracted = content.substring_from_bytes(class_start, class_end);
        assert!(extracted.starts_with("public class"));
        assert!(extracted.ends_with('}'));
    }

    #[test]
    fn substring_from_bytes_is_empty_for_inverted_or_out_of_range() {
        let content = SourceContent::new(b"short");
        assert_eq!(content.substring_from_bytes(3, 1), "");
        assert_eq!(content.substring_from_bytes(100, 200), "");
        assert_eq!(content.substring_from_bytes(2, 2), "");
    }

    #[test]
    fn substring_from_bytes_snaps_inward_on_bad_boundaries() {
        let text = "café";
        let content = SourceContent::new(text.as_bytes());
        // byte 3 is inside the 2-byte 'é'; snapping inward must not panic
        // and must not include a half-decoded character.
        let extracted = content.substring_from_bytes(0, 3);
        assert!(text.as_bytes()[..extracted.len()].starts_with(b"caf"));
    }
}
