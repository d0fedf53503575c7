//! Viewer session: one window, its search state, and the bookmark store.
//!
//! Every mutation that can change the window's lines or the query ends with
//! an explicit search recompute, so derived state is never stale when a
//! frame is rendered.
//!
//! Reads go through a background [`ChunkLoader`] when one is attached, and
//! run inline otherwise. Either way a completion is only applied if its token
//! is still the newest.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::core::bookmarks::{Bookmark, BookmarkStore, Toggle, Warp};
use crate::core::chunk::{CHUNK_SIZE, ChunkReader};
use crate::core::level::LogLevel;
use crate::core::line_ref::{self, LineRef};
use crate::core::loader::{ChunkLoader, LoadResponse};
use crate::core::search::{SearchQuery, SearchState};
use crate::core::source::{ByteSource, LogSource, SourceError, SourceMeta};
use crate::core::window::{Completion, LoadStatus, SeekTicket, WindowState};

/// Name given to pasted content.
pub const PASTE_NAME: &str = "clipboard_content.log";

/// How long [`Session::wait`] blocks for a single response.
const WAIT_SLICE: Duration = Duration::from_millis(250);

/// A line as a front-end should draw it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedLine {
    pub id: String,
    pub global: LineRef,
    pub local: usize,
    pub text: String,
    pub level: LogLevel,
    pub is_bookmarked: bool,
    pub is_match: bool,
    /// Line the search cursor sits on.
    pub is_current: bool,
}

/// Everything needed to draw one screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    pub source: Option<String>,
    pub total_bytes: u64,
    pub offset: u64,
    pub percentage: f64,
    pub is_loading: bool,
    pub status: LoadStatus,
    pub bookmark_count: usize,
    pub match_count: usize,
    pub search_error: Option<String>,
    pub lines: Vec<RenderedLine>,
}

/// Minimap cell colour class, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MinimapKind {
    Bookmarked,
    Error,
    Warn,
    Info,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MinimapCell {
    pub line: LineRef,
    pub kind: MinimapKind,
}

/// Scroll target waiting for a specific load to land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingScroll {
    token: u64,
    line: u64,
    ready: bool,
}

#[derive(Debug)]
pub struct Session {
    window: WindowState,
    loader: Option<ChunkLoader>,
    search: SearchState,
    bookmarks: BookmarkStore,
    focus: bool,
    pending_scroll: Option<PendingScroll>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ChunkReader::default())
    }
}

impl Session {
    /// A session whose reads run on the calling thread.
    pub fn new(reader: ChunkReader) -> Self {
        Self {
            window: WindowState::new(reader),
            loader: None,
            search: SearchState::default(),
            bookmarks: BookmarkStore::new(),
            focus: false,
            pending_scroll: None,
        }
    }

    /// A session whose reads run on a background thread.
    pub fn with_background_loader(reader: ChunkReader) -> std::io::Result<Self> {
        let mut session = Self::new(reader);
        session.loader = Some(ChunkLoader::spawn()?);
        Ok(session)
    }

    pub fn window(&self) -> &WindowState {
        &self.window
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    /// Replaces the bookmark set, e.g. from a persisted snapshot.
    pub fn restore_bookmarks(&mut self, store: BookmarkStore) {
        self.bookmarks = store;
    }

    pub fn focus(&self) -> bool {
        self.focus
    }

    pub fn meta(&self) -> Option<SourceMeta> {
        self.window.meta()
    }

    // ---- loading -------------------------------------------------------

    /// Replaces the source. Clears bookmarks and any pending scroll.
    pub fn load_source(&mut self, source: Arc<dyn ByteSource>) {
        info!(name = source.name(), bytes = source.len(), "opening source");
        self.bookmarks.clear();
        self.pending_scroll = None;
        let ticket = self.window.load_source(source);
        self.search.recompute(self.window.lines());
        self.dispatch(ticket);
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<SourceMeta, SourceError> {
        let source = LogSource::open(path)?.into_shared();
        let meta = SourceMeta::of(source.as_ref());
        self.load_source(source);
        Ok(meta)
    }

    /// Loads pasted text as if it were a file.
    pub fn load_text(&mut self, text: impl Into<String>) -> SourceMeta {
        let source = LogSource::from_text(PASTE_NAME, text).into_shared();
        let meta = SourceMeta::of(source.as_ref());
        self.load_source(source);
        meta
    }

    // ---- navigation ----------------------------------------------------

    pub fn seek(&mut self, offset: u64) {
        if let Some(ticket) = self.window.seek(offset) {
            self.dispatch(ticket);
        }
    }

    /// Slider input: percentage of the file in `[0, 100]`.
    pub fn seek_percentage(&mut self, percentage: f64) {
        let offset = self.window.offset_for_percentage(percentage);
        self.seek(offset);
    }

    /// Seeks near an approximate global line number.
    pub fn seek_line(&mut self, line: u64) {
        self.seek(line_ref::from_global(line));
    }

    pub fn page_forward(&mut self) {
        let next = self.window.offset().saturating_add(CHUNK_SIZE as u64);
        if next < self.window.total_bytes() {
            self.seek(next);
        }
    }

    pub fn page_back(&mut self) {
        let prev = self.window.offset().saturating_sub(CHUNK_SIZE as u64);
        if prev != self.window.offset() {
            self.seek(prev);
        }
    }

    fn dispatch(&mut self, ticket: SeekTicket) {
        let reader = *self.window.reader();
        let ticket = match &self.loader {
            Some(loader) => match loader.submit(ticket, reader) {
                Ok(()) => return,
                Err(ticket) => {
                    debug!("reader thread gone; reading inline");
                    ticket
                }
            },
            None => ticket,
        };

        let result = ticket.read(&reader);
        self.apply(LoadResponse {
            token: ticket.token,
            result,
        });
    }

    fn apply(&mut self, response: LoadResponse) -> Completion {
        let token = response.token;
        let outcome = self.window.complete(token, response.result);
        if outcome == Completion::Stale {
            return outcome;
        }

        self.search.recompute(self.window.lines());
        // A pending scroll survives only the load it was waiting for, and
        // only when that load put its window on screen
        self.pending_scroll = self.pending_scroll.and_then(|p| {
            (p.token == token && outcome == Completion::Applied)
                .then_some(PendingScroll { ready: true, ..p })
        });
        outcome
    }

    /// Applies every finished background read. Returns how many applied.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Some(resp) = self.loader.as_ref().and_then(ChunkLoader::try_recv) {
            if self.apply(resp) != Completion::Stale {
                applied += 1;
            }
        }
        applied
    }

    /// Blocks until the newest seek has landed (or failed).
    pub fn wait(&mut self) {
        while self.window.is_loading() {
            let Some(loader) = &self.loader else {
                return;
            };
            match loader.recv_timeout(WAIT_SLICE) {
                Some(resp) => {
                    self.apply(resp);
                }
                None if !loader.is_running() => return,
                None => {}
            }
        }
    }

    // ---- search --------------------------------------------------------

    pub fn set_search(&mut self, query: SearchQuery) {
        self.search.set_query(query, self.window.lines());
    }

    pub fn set_focus(&mut self, focus: bool) {
        self.focus = focus;
    }

    pub fn next_match(&mut self) -> Option<LineRef> {
        let local = self.search.next()?;
        Some(LineRef::new(self.window.offset(), local))
    }

    pub fn prev_match(&mut self) -> Option<LineRef> {
        let local = self.search.prev()?;
        Some(LineRef::new(self.window.offset(), local))
    }

    // ---- bookmarks -----------------------------------------------------

    /// Toggles a bookmark on the window line at `local`.
    pub fn toggle_bookmark(&mut self, local: usize) -> Option<Toggle> {
        let text = self.window.lines().get(local)?;
        let line = line_ref::to_global(self.window.offset(), local);
        Some(self.bookmarks.toggle(line, text, self.window.offset()))
    }

    /// Brings a bookmarked line into view.
    ///
    /// Returns `Some(line)` when the line is already in the window and can be
    /// scrolled to now. Otherwise a seek is issued and the line becomes
    /// available from [`Session::take_pending_scroll`] once it has loaded.
    #[instrument(level = "debug", skip(self))]
    pub fn warp_to(&mut self, line: u64) -> Option<u64> {
        let bookmark: Bookmark = self.bookmarks.get(line)?.clone();
        match BookmarkStore::warp(&bookmark, &mut self.window)? {
            Warp::Scroll { line } => Some(line),
            Warp::Seek { ticket, line } => {
                self.pending_scroll = Some(PendingScroll {
                    token: ticket.token,
                    line,
                    ready: false,
                });
                self.dispatch(ticket);
                None
            }
        }
    }

    /// Consumes the deferred scroll target once its load has completed.
    pub fn take_pending_scroll(&mut self) -> Option<u64> {
        match self.pending_scroll {
            Some(p) if p.ready && !self.window.is_loading() => {
                self.pending_scroll = None;
                Some(p.line)
            }
            _ => None,
        }
    }

    // ---- rendering -----------------------------------------------------

    pub fn frame(&self) -> RenderFrame {
        let offset = self.window.offset();
        let lines = self.window.lines();
        let cursor = self.search.cursor();

        let rendered = self
            .search
            .visible_indices(lines.len(), self.focus)
            .into_iter()
            .filter_map(|local| {
                let text = lines.get(local)?;
                let global = LineRef::new(offset, local);
                Some(RenderedLine {
                    id: global.id(),
                    global,
                    local,
                    text: text.clone(),
                    level: LogLevel::classify(text),
                    is_bookmarked: self.bookmarks.contains(global.number()),
                    is_match: self.search.is_match(local),
                    is_current: cursor == Some(local),
                })
            })
            .collect();

        RenderFrame {
            source: self.window.source().map(|s| s.name().to_string()),
            total_bytes: self.window.total_bytes(),
            offset,
            percentage: self.window.percentage(),
            is_loading: self.window.is_loading(),
            status: self.window.status().clone(),
            bookmark_count: self.bookmarks.len(),
            match_count: self.search.matches().len(),
            search_error: self.search.error().map(str::to_string),
            lines: rendered,
        }
    }

    /// One cell per window line, coloured by bookmark and severity.
    pub fn minimap(&self) -> Vec<MinimapCell> {
        let offset = self.window.offset();
        self.window
            .lines()
            .iter()
            .enumerate()
            .map(|(local, text)| {
                let line = LineRef::new(offset, local);
                let kind = if self.bookmarks.contains(line.number()) {
                    MinimapKind::Bookmarked
                } else {
                    match LogLevel::classify(text) {
                        LogLevel::Error => MinimapKind::Error,
                        LogLevel::Warn => MinimapKind::Warn,
                        LogLevel::Info => MinimapKind::Info,
                        LogLevel::Default => MinimapKind::Default,
                    }
                };
                MinimapCell { line, kind }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(text: &str) -> Session {
        let mut s = Session::default();
        s.load_text(text.to_string());
        s
    }

    #[test]
    fn inline_session_loads_immediately() {
        let s = session_with("info start\nwarn slow\nerror boom\n");
        let f = s.frame();
        assert!(!f.is_loading);
        assert_eq!(f.source.as_deref(), Some(PASTE_NAME));
        assert_eq!(f.lines.len(), 3);
        assert_eq!(f.lines[2].id, "line-2");
        assert_eq!(f.lines[2].level, LogLevel::Error);
    }

    #[test]
    fn focus_mode_shows_only_matches() {
        let mut s = session_with("a ERROR\nb ok\nc error\n");
        s.set_search(SearchQuery::literal("error"));
        s.set_focus(true);
        let locals: Vec<_> = s.frame().lines.iter().map(|l| l.local).collect();
        assert_eq!(locals, vec![0, 2]);

        s.set_focus(false);
        assert_eq!(s.frame().lines.len(), 3);
    }

    #[test]
    fn match_navigation_marks_current_line() {
        let mut s = session_with("x\nhit\nx\nhit\n");
        s.set_search(SearchQuery::literal("hit"));
        assert_eq!(s.next_match(), Some(LineRef(1)));
        assert_eq!(s.next_match(), Some(LineRef(3)));
        assert_eq!(s.next_match(), Some(LineRef(1)));
        assert_eq!(s.prev_match(), Some(LineRef(3)));
        let current: Vec<_> = s.frame().lines.iter().filter(|l| l.is_current).map(|l| l.local).collect();
        assert_eq!(current, vec![3]);
    }

    #[test]
    fn loading_clears_bookmarks() {
        let mut s = session_with("one\ntwo\n");
        assert_eq!(s.toggle_bookmark(1), Some(Toggle::Added));
        assert_eq!(s.frame().bookmark_count, 1);
        s.load_text("other\n");
        assert!(s.bookmarks().is_empty());
    }

    #[test]
    fn warp_in_current_window_scrolls_now() {
        let mut s = session_with("one\ntwo\n");
        s.toggle_bookmark(1);
        assert_eq!(s.warp_to(1), Some(1));
        assert_eq!(s.take_pending_scroll(), None);
    }

    #[test]
    fn warp_to_other_window_defers_scroll_until_loaded() {
        let text = "l\n".repeat(40_000);
        let mut s = session_with(&text);
        s.seek(60_000);
        s.toggle_bookmark(5);
        let line = line_ref::to_global(60_000, 5);
        s.seek(0);

        assert_eq!(s.warp_to(line), None);
        assert_eq!(s.window().offset(), 60_000);
        assert_eq!(s.take_pending_scroll(), Some(line));
        assert_eq!(s.take_pending_scroll(), None);
    }

    #[test]
    fn warp_to_unknown_line_is_none() {
        let mut s = session_with("one\n");
        assert_eq!(s.warp_to(42), None);
        assert_eq!(s.take_pending_scroll(), None);
    }

    #[test]
    fn minimap_prefers_bookmarks_over_severity() {
        let mut s = session_with("error a\nwarn b\ninfo c\nplain\n");
        s.toggle_bookmark(0);
        let kinds: Vec<_> = s.minimap().into_iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MinimapKind::Bookmarked,
                MinimapKind::Warn,
                MinimapKind::Info,
                MinimapKind::Default
            ]
        );
    }

    #[test]
    fn paging_moves_one_chunk() {
        let text = "0123456789\n".repeat(12_000);
        let mut s = session_with(&text);
        s.page_forward();
        assert_eq!(s.window().offset(), CHUNK_SIZE as u64);
        s.page_forward();
        s.page_forward();
        assert_eq!(s.window().offset(), 2 * CHUNK_SIZE as u64);
        s.page_back();
        assert_eq!(s.window().offset(), CHUNK_SIZE as u64);
    }

    #[test]
    fn invalid_pattern_surfaces_in_frame() {
        let mut s = session_with("a\n");
        s.set_search(SearchQuery::pattern("[unclosed"));
        let f = s.frame();
        assert_eq!(f.match_count, 0);
        assert!(f.search_error.is_some());
    }
}
