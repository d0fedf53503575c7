//! Newline index over a single chunk of raw bytes.
//!
//! Goals
//! - Single pass over bytes to record '\n' positions.
//! - 0-based fragment addressing (a fragment is the text between two '\n').
//! - Fragment end excludes a trailing '\r' so CRLF logs render cleanly.
//!
//! Notes
//! - An empty buffer has 0 fragments.
//! - A non-empty buffer has (#'\n' + 1) fragments; the last one is empty
//!   when the buffer ends with '\n'.
//! - Spans are half-open (Rust slicing convention) and chunk-relative.

use std::ops::Range;

#[derive(Debug, Clone)]
pub struct NewlineIndex {
    /// Byte positions of every '\n' in the buffer.
    nl_positions: Vec<usize>,
    /// Total byte length of the buffer.
    len: usize,
}

impl NewlineIndex {
    /// Build an index recording positions of '\n'.
    pub fn build(bytes: &[u8]) -> Self {
        // Log lines average well above 48 bytes; this only sizes the Vec.
        let mut nl_positions = Vec::with_capacity(bytes.len() / 48);
        nl_positions.extend(memchr::memchr_iter(b'\n', bytes));

        Self {
            nl_positions,
            len: bytes.len(),
        }
    }

    /// Number of newline-separated fragments.
    pub fn fragment_count(&self) -> usize {
        if self.len == 0 {
            0
        } else {
            self.nl_positions.len() + 1
        }
    }

    /// Whether the buffer's last byte is '\n'.
    pub fn ends_with_newline(&self) -> bool {
        self.len > 0 && self.nl_positions.last() == Some(&(self.len - 1))
    }

    /// Byte span of fragment `i`, without its '\n' and any trailing '\r'.
    pub fn fragment_span(&self, i: usize, bytes: &[u8]) -> Option<Range<usize>> {
        if i >= self.fragment_count() {
            return None;
        }

        let start = if i == 0 { 0 } else { self.nl_positions[i - 1] + 1 };
        let mut end = self.nl_positions.get(i).copied().unwrap_or(self.len);

        if end > start && bytes.get(end - 1) == Some(&b'\r') {
            end -= 1;
        }

        Some(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_buffer_has_no_fragments() {
        let idx = NewlineIndex::build(b"");
        assert_eq!(idx.fragment_count(), 0);
        assert!(!idx.ends_with_newline());
        assert!(idx.fragment_span(0, b"").is_none());
    }

    #[test]
    fn trailing_newline_yields_empty_last_fragment() {
        let bytes = b"a\nbb\n";
        let idx = NewlineIndex::build(bytes);
        assert_eq!(idx.fragment_count(), 3);
        assert!(idx.ends_with_newline());
        assert_eq!(idx.fragment_span(0, bytes), Some(0..1));
        assert_eq!(idx.fragment_span(1, bytes), Some(2..4));
        assert_eq!(idx.fragment_span(2, bytes), Some(5..5));
    }

    #[test]
    fn crlf_is_excluded_from_span() {
        let bytes = b"one\r\ntwo\r\nthree";
        let idx = NewlineIndex::build(bytes);
        let spans: Vec<_> = (0..idx.fragment_count())
            .map(|i| &bytes[idx.fragment_span(i, bytes).unwrap()])
            .collect();
        assert_eq!(spans, vec![&b"one"[..], b"two", b"three"]);
    }
}
