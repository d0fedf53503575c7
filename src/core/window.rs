//! The live window over the loaded source.
//!
//! Seeking is split in two so reads can run elsewhere: [`WindowState::seek`]
//! issues a [`SeekTicket`] carrying a fresh request token, and
//! [`WindowState::complete`] applies a read result only if its token is still
//! the newest. Older results are dropped (last seek wins).

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::chunk::{Chunk, ChunkReader, ReadError};
use crate::core::source::{ByteSource, SourceMeta};

/// Where the window is in its load cycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
#[serde(tag = "state", content = "message", rename_all = "lowercase")]
pub enum LoadStatus {
    /// Nothing loaded yet.
    #[default]
    Idle,
    Loading,
    Ready,
    /// The last read failed; the previous window is still shown.
    Failed(String),
}

/// A read the window is waiting for.
#[derive(Debug, Clone)]
pub struct SeekTicket {
    pub token: u64,
    pub offset: u64,
    pub source: Arc<dyn ByteSource>,
}

impl SeekTicket {
    /// Performs the read on the calling thread.
    pub fn read(&self, reader: &ChunkReader) -> Result<Chunk, ReadError> {
        reader.read(self.source.as_ref(), self.offset)
    }
}

/// Outcome of handing a read result back to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Failed,
    /// A newer seek was issued after this one; the result was discarded.
    Stale,
}

#[derive(Debug, Default)]
pub struct WindowState {
    source: Option<Arc<dyn ByteSource>>,
    reader: ChunkReader,
    offset: u64,
    lines: Vec<String>,
    status: LoadStatus,
    latest_token: u64,
}

impl WindowState {
    pub fn new(reader: ChunkReader) -> Self {
        Self {
            reader,
            ..Self::default()
        }
    }

    pub fn reader(&self) -> &ChunkReader {
        &self.reader
    }

    pub fn source(&self) -> Option<&Arc<dyn ByteSource>> {
        self.source.as_ref()
    }

    pub fn meta(&self) -> Option<SourceMeta> {
        self.source.as_deref().map(SourceMeta::of)
    }

    pub fn total_bytes(&self) -> u64 {
        self.source.as_ref().map_or(0, |s| s.len())
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    /// Token of the most recent seek.
    pub fn latest_token(&self) -> u64 {
        self.latest_token
    }

    /// Scroll position in percent, derived from the offset.
    pub fn percentage(&self) -> f64 {
        let total = self.total_bytes();
        if total == 0 {
            0.0
        } else {
            self.offset as f64 / total as f64 * 100.0
        }
    }

    /// Byte offset a slider at `percentage` points at.
    pub fn offset_for_percentage(&self, percentage: f64) -> u64 {
        let p = if percentage.is_nan() {
            0.0
        } else {
            percentage.clamp(0.0, 100.0)
        };
        (p / 100.0 * self.total_bytes() as f64).floor() as u64
    }

    fn clamp_offset(&self, offset: u64) -> u64 {
        match self.total_bytes() {
            0 => 0,
            total => offset.min(total - 1),
        }
    }

    /// Replaces the source and issues a read of its first window.
    ///
    /// The previous window's lines are discarded; any read still in flight
    /// for the old source is superseded by the new token.
    pub fn load_source(&mut self, source: Arc<dyn ByteSource>) -> SeekTicket {
        debug!(name = source.name(), bytes = source.len(), "loading source");
        self.source = Some(Arc::clone(&source));
        self.offset = 0;
        self.lines.clear();
        self.status = LoadStatus::Idle;
        self.issue(source, 0)
    }

    /// Starts a seek. `None` when no source is loaded.
    pub fn seek(&mut self, offset: u64) -> Option<SeekTicket> {
        let source = Arc::clone(self.source.as_ref()?);
        Some(self.issue(source, offset))
    }

    fn issue(&mut self, source: Arc<dyn ByteSource>, offset: u64) -> SeekTicket {
        let offset = self.clamp_offset(offset);
        self.latest_token += 1;
        self.status = LoadStatus::Loading;

        debug!(token = self.latest_token, offset, "seek issued");
        SeekTicket {
            token: self.latest_token,
            offset,
            source,
        }
    }

    /// Applies a read result if `token` is still the newest.
    pub fn complete(&mut self, token: u64, result: Result<Chunk, ReadError>) -> Completion {
        if token != self.latest_token {
            debug!(token, latest = self.latest_token, "dropping stale read");
            return Completion::Stale;
        }

        match result {
            Ok(chunk) => {
                self.offset = chunk.offset;
                self.lines = chunk.lines;
                self.status = LoadStatus::Ready;
                Completion::Applied
            }
            Err(err) => {
                warn!(token, error = %err, "window read failed; keeping previous window");
                self.status = LoadStatus::Failed(err.to_string());
                Completion::Failed
            }
        }
    }

    /// Seeks and reads on the calling thread.
    pub fn seek_blocking(&mut self, offset: u64) -> Option<Completion> {
        let ticket = self.seek(offset)?;
        let result = ticket.read(&self.reader);
        Some(self.complete(ticket.token, result))
    }
}
