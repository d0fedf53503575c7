//! **logwarp** - Windowed viewer core for log files too large to load whole
//!
//! A file is never read in full: the viewer holds one ~50 KB window of
//! complete lines, seeks by byte offset or percentage, and keeps search and
//! bookmarks consistent as windows are swapped.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core windowing engine - sources, chunk reads, window state, search, bookmarks
pub mod core {
    /// Byte sources (memory-mapped files, pasted text)
    pub mod source;
    pub use source::{ByteSource, LogSource, SourceError, SourceMeta};

    /// Chunk reads with line-boundary trimming
    pub mod chunk;
    pub use chunk::{CHUNK_SIZE, Chunk, ChunkReader, Decoding, ReadError};

    /// Approximate global line numbers
    pub mod line_ref;
    pub use line_ref::{AVG_BYTES_PER_LINE, LineRef};

    /// Current window, seek tokens, last-seek-wins completion
    pub mod window;
    pub use window::{Completion, LoadStatus, SeekTicket, WindowState};

    /// Background reader thread
    pub mod loader;
    pub use loader::{ChunkLoader, LoadResponse};

    /// Literal/regex search over the window
    pub mod search;
    pub use search::{SearchQuery, SearchState};

    /// Bookmarks and warp planning
    pub mod bookmarks;
    pub use bookmarks::{Bookmark, BookmarkStore, Toggle, Warp};

    /// Severity keywords and embedded JSON
    pub mod level;
    pub use level::LogLevel;

    /// Persistence port, history, bookmark snapshots
    pub mod persist;
    pub use persist::{JsonFileStore, MemoryStore, PersistError, RecentFile, StatePort};

    /// Viewer session tying it all together
    pub mod session;
    pub use session::{RenderFrame, RenderedLine, Session};
}

/// Command handlers behind the CLI
pub mod cli_ext {
    pub mod bookmark_cmd;
    pub mod history_cmd;
    pub mod interactive_cmd;
    pub mod paste_cmd;
    pub mod view_cmd;

    /// Frame, line and minimap printing
    pub mod render;

    mod shared;
}

/// Infrastructure - Configuration, I/O, and utilities
pub mod infra {
    /// Configuration management with TOML support and env overrides
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Memory-mapped file I/O for large files (>1MB threshold)
    pub mod io;
    pub use io::{FileContent, read_file_smart};

    /// CRLF/LF-robust newline indexing
    pub mod line_index;
    pub use line_index::NewlineIndex;

    /// Size formatting and text truncation
    pub mod utils;
}

pub use crate::cli::{AppContext, Cli, Commands};
pub use crate::core::{ChunkReader, Session, WindowState};
pub use crate::infra::{Config, load_config};
