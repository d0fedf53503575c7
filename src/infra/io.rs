use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

use crate::core::source::SourceError;

const MMAP_THRESHOLD: u64 = 1024 * 1024; // 1 MiB

/// Raw bytes backing a log source.
///
/// Large files are memory-mapped so only the pages a window touches become
/// resident; small files and pasted text live in a plain buffer.
pub enum FileContent {
    Mapped(Mmap),
    Buffered(Vec<u8>),
}

impl FileContent {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            FileContent::Mapped(mmap) => mmap,
            FileContent::Buffered(buf) => buf,
        }
    }

    /// Gets bytes starting at `start`, up to `length`.
    /// Past-the-end requests are clamped; a start beyond EOF yields `&[]`.
    #[inline]
    pub fn get_bytes_clamped(&self, start: usize, length: usize) -> &[u8] {
        let bytes = self.as_bytes();
        if start >= bytes.len() {
            return &[];
        }

        let end = std::cmp::min(start.saturating_add(length), bytes.len());
        &bytes[start..end]
    }
}

impl std::fmt::Debug for FileContent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileContent::Mapped(m) => f.debug_tuple("Mapped").field(&m.len()).finish(),
            FileContent::Buffered(b) => f.debug_tuple("Buffered").field(&b.len()).finish(),
        }
    }
}

pub fn read_file_smart<P: AsRef<Path>>(path: P) -> Result<FileContent, SourceError> {
    let path = path.as_ref();
    let metadata = std::fs::metadata(path).map_err(|e| SourceError::open(path, e))?;

    if metadata.len() > MMAP_THRESHOLD {
        // Use memory mapping for large files
        let file = File::open(path).map_err(|e| SourceError::open(path, e))?;

        // Safety: the map is read-only and the file handle is not written to.
        // Truncation by another process while mapped is not guarded against.
        let mmap = unsafe { Mmap::map(&file) }.map_err(|e| SourceError::Map {
            path: path.to_path_buf(),
            source: e,
        })?;

        debug!(path = %path.display(), bytes = metadata.len(), "memory-mapped log source");
        Ok(FileContent::Mapped(mmap))
    } else {
        // Read small files into memory
        let content = std::fs::read(path).map_err(|e| SourceError::open(path, e))?;

        debug!(path = %path.display(), bytes = content.len(), "buffered log source");
        Ok(FileContent::Buffered(content))
    }
}
