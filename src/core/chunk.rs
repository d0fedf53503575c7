//! Cuts a line-aligned window out of a byte source.
//!
//! A window is a fixed `CHUNK_SIZE` slice. Its edges rarely land on line
//! boundaries, so the partial line at either edge is dropped:
//! - the first fragment when the window does not start at byte 0 (it is the
//!   tail of a line that began in the previous window);
//! - the last fragment when more bytes follow the window (the next window
//!   starts inside it).
//!
//! The final window keeps its last fragment even without a terminating '\n'.

use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

use crate::core::source::ByteSource;
use crate::infra::line_index::NewlineIndex;

/// Bytes per window.
pub const CHUNK_SIZE: usize = 50 * 1024;

/// How window bytes become text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decoding {
    /// Invalid UTF-8 is replaced with U+FFFD.
    #[default]
    Lossy,
    /// Invalid UTF-8 in a kept line fails the read.
    Strict,
}

/// Chunk read failure. The caller keeps its previous window.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("I/O error reading at byte {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid UTF-8 in line starting at byte {offset}")]
    Decode { offset: u64 },
    #[error("offset {offset} is past the end of a {total}-byte source")]
    OutOfRange { offset: u64, total: u64 },
}

/// A decoded window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Byte position the window starts at.
    pub offset: u64,
    /// Boundary-trimmed lines, without line terminators.
    pub lines: Vec<String>,
    /// Bytes sliced from the source.
    pub bytes_consumed: usize,
}

impl Chunk {
    fn empty(offset: u64) -> Self {
        Self {
            offset,
            lines: Vec::new(),
            bytes_consumed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkReader {
    decoding: Decoding,
}

impl ChunkReader {
    pub fn new(decoding: Decoding) -> Self {
        Self { decoding }
    }

    pub fn decoding(&self) -> Decoding {
        self.decoding
    }

    #[instrument(level = "debug", skip(self, source), fields(source = source.name()))]
    pub fn read(&self, source: &dyn ByteSource, offset: u64) -> Result<Chunk, ReadError> {
        let total = source.len();
        if total == 0 {
            return Ok(Chunk::empty(0));
        }
        if offset >= total {
            return Err(ReadError::OutOfRange { offset, total });
        }

        // Remaining bytes fit in usize whenever they are below CHUNK_SIZE
        let want = usize::try_from(total - offset).map_or(CHUNK_SIZE, |rest| rest.min(CHUNK_SIZE));
        let bytes = source
            .read_range(offset, want)
            .map_err(|e| ReadError::Io { offset, source: e })?;

        let idx = NewlineIndex::build(&bytes);
        let is_final = offset + bytes.len() as u64 >= total;

        let mut first = 0;
        let mut end = idx.fragment_count();
        if offset > 0 {
            first = 1;
        }
        if !is_final || idx.ends_with_newline() {
            // Either truncated by the right edge, or the empty tail after EOF '\n'
            end = end.saturating_sub(1);
        }

        let mut lines = Vec::with_capacity(end.saturating_sub(first));
        for i in first..end.max(first) {
            let Some(span) = idx.fragment_span(i, &bytes) else {
                break;
            };
            let line_offset = offset + span.start as u64;
            let raw = &bytes[span];
            let text = match self.decoding {
                Decoding::Lossy => String::from_utf8_lossy(raw).into_owned(),
                Decoding::Strict => std::str::from_utf8(raw)
                    .map_err(|_| ReadError::Decode {
                        offset: line_offset,
                    })?
                    .to_owned(),
            };
            lines.push(text);
        }

        trace!(
            offset,
            bytes = bytes.len(),
            lines = lines.len(),
            is_final,
            "decoded window"
        );

        Ok(Chunk {
            offset,
            lines,
            bytes_consumed: bytes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::LogSource;

    fn read(text: &str, offset: u64) -> Vec<String> {
        let src = LogSource::from_text("t.log", text);
        ChunkReader::default().read(&src, offset).unwrap().lines
    }

    #[test]
    fn whole_small_file_is_one_window() {
        assert_eq!(read("a\nb\nc", 0), vec!["a", "b", "c"]);
    }

    #[test]
    fn eof_newline_does_not_add_an_empty_line() {
        assert_eq!(read("a\nb\n", 0), vec!["a", "b"]);
    }

    #[test]
    fn interior_blank_lines_survive() {
        assert_eq!(read("a\n\nb\n", 0), vec!["a", "", "b"]);
    }

    #[test]
    fn nonzero_offset_drops_leading_fragment() {
        // offset 4 lands inside "bbb"
        assert_eq!(read("aa\nbbb\nccc", 4), vec!["ccc"]);
    }

    #[test]
    fn offset_on_line_start_still_drops_first_fragment() {
        assert_eq!(read("aa\nbbb\nccc", 3), vec!["ccc"]);
    }

    #[test]
    fn empty_source_is_empty_window() {
        let chunk = ChunkReader::default()
            .read(&LogSource::from_text("e", ""), 0)
            .unwrap();
        assert!(chunk.lines.is_empty());
        assert_eq!(chunk.bytes_consumed, 0);
    }

    #[test]
    fn offset_past_end_is_rejected() {
        let err = ChunkReader::default()
            .read(&LogSource::from_text("e", "abc"), 3)
            .unwrap_err();
        assert!(matches!(err, ReadError::OutOfRange { offset: 3, total: 3 }));
    }

    #[test]
    fn crlf_lines_are_trimmed() {
        assert_eq!(read("x\r\ny\r\n", 0), vec!["x", "y"]);
    }

    #[test]
    fn strict_decoding_rejects_invalid_utf8_in_kept_line() {
        let src = BytesSource(b"ok\n\xff\xfe\n".to_vec());
        let err = ChunkReader::new(Decoding::Strict).read(&src, 0).unwrap_err();
        assert!(matches!(err, ReadError::Decode { offset: 3 }));

        let lossy = ChunkReader::new(Decoding::Lossy).read(&src, 0).unwrap();
        assert_eq!(lossy.lines[0], "ok");
        assert_eq!(lossy.lines[1], "\u{FFFD}\u{FFFD}");
    }

    #[derive(Debug)]
    struct BytesSource(Vec<u8>);

    impl ByteSource for BytesSource {
        fn name(&self) -> &str {
            "bytes"
        }
        fn len(&self) -> u64 {
            self.0.len() as u64
        }
        fn read_range(&self, offset: u64, len: usize) -> std::io::Result<std::borrow::Cow<'_, [u8]>> {
            let start = offset as usize;
            let end = (start + len).min(self.0.len());
            Ok(std::borrow::Cow::Borrowed(&self.0[start..end]))
        }
    }
}
