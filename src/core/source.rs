//! Byte sources a window can be cut from.
//!
//! A source is immutable for its lifetime; loading another file or a paste
//! replaces it wholesale.

use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::infra::io::{FileContent, read_file_smart};

/// Failure to open a source at load time.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to memory-map {}: {source}", path.display())]
    Map {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SourceError {
    pub(crate) fn open(path: &Path, source: io::Error) -> Self {
        SourceError::Open {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Seekable byte container of known size.
pub trait ByteSource: Send + Sync + std::fmt::Debug {
    /// Display name (file name, or a synthetic name for pastes).
    fn name(&self) -> &str;

    /// Total size in bytes.
    fn len(&self) -> u64;

    /// Reads up to `len` bytes at `offset`. Short reads happen only at EOF.
    fn read_range(&self, offset: u64, len: usize) -> io::Result<Cow<'_, [u8]>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Name and size captured when a source is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMeta {
    pub name: String,
    pub size: u64,
}

impl SourceMeta {
    pub fn of(source: &dyn ByteSource) -> Self {
        Self {
            name: source.name().to_string(),
            size: source.len(),
        }
    }
}

/// A log file on disk, or pasted text held in memory.
#[derive(Debug)]
pub struct LogSource {
    name: String,
    content: FileContent,
}

impl LogSource {
    /// Opens a file; mapped above 1 MiB, buffered below.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let content = read_file_smart(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { name, content })
    }

    /// Wraps pasted text.
    pub fn from_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: FileContent::Buffered(text.into().into_bytes()),
        }
    }

    pub fn into_shared(self) -> Arc<dyn ByteSource> {
        Arc::new(self)
    }
}

impl ByteSource for LogSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn len(&self) -> u64 {
        self.content.as_bytes().len() as u64
    }

    fn read_range(&self, offset: u64, len: usize) -> io::Result<Cow<'_, [u8]>> {
        let start = usize::try_from(offset)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        Ok(Cow::Borrowed(self.content.get_bytes_clamped(start, len)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pasted_text_reads_back() {
        let src = LogSource::from_text("clipboard_content.log", "a\nb\nc");
        assert_eq!(src.name(), "clipboard_content.log");
        assert_eq!(src.len(), 5);
        assert_eq!(&*src.read_range(2, 10).unwrap(), b"b\nc");
        assert!(src.read_range(9, 1).unwrap().is_empty());
    }

    #[test]
    fn meta_captures_name_and_size() {
        let src = LogSource::from_text("x.log", "12345");
        assert_eq!(
            SourceMeta::of(&src),
            SourceMeta {
                name: "x.log".into(),
                size: 5
            }
        );
    }

    #[test]
    fn file_name_becomes_source_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "line\n").unwrap();

        let src = LogSource::open(&path).unwrap();
        assert_eq!(src.name(), "app.log");
        assert_eq!(src.len(), 5);
    }
}
