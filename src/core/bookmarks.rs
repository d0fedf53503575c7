//! Bookmarks keyed by approximate global line number.
//!
//! Each bookmark remembers the window offset it was captured in. Warping to
//! a bookmark from that same window is a pure scroll; from any other window
//! it needs a re-seek first, with the scroll deferred until the load lands.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::window::{SeekTicket, WindowState};
use crate::infra::utils::TextUtils;

/// Longest snippet kept, in characters (an ellipsis is appended past this).
pub const SNIPPET_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub line_num: u64,
    pub content: String,
    pub chunk_offset: u64,
}

/// Result of a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// What a front-end must do to show a bookmarked line.
#[derive(Debug)]
pub enum Warp {
    /// The line is in the current window; scroll to it and flash it.
    Scroll { line: u64 },
    /// A different window must load first; scroll once it has.
    Seek { ticket: SeekTicket, line: u64 },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookmarkStore {
    marks: BTreeMap<u64, Bookmark>,
}

impl BookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bookmark for `line_num`, or removes the existing one.
    pub fn toggle(&mut self, line_num: u64, content: &str, current_offset: u64) -> Toggle {
        if self.marks.remove(&line_num).is_some() {
            debug!(line_num, "bookmark removed");
            return Toggle::Removed;
        }

        self.marks.insert(
            line_num,
            Bookmark {
                line_num,
                content: TextUtils::truncate_chars(content, SNIPPET_CHARS),
                chunk_offset: current_offset,
            },
        );
        debug!(line_num, chunk_offset = current_offset, "bookmark added");
        Toggle::Added
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    pub fn get(&self, line_num: u64) -> Option<&Bookmark> {
        self.marks.get(&line_num)
    }

    pub fn contains(&self, line_num: u64) -> bool {
        self.marks.contains_key(&line_num)
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Bookmarks in ascending line order.
    pub fn list(&self) -> impl Iterator<Item = &Bookmark> {
        self.marks.values()
    }

    /// Decides how to bring `bookmark` into view, seeking if needed.
    ///
    /// Returns `None` when a seek is required but no source is loaded.
    pub fn warp(bookmark: &Bookmark, window: &mut WindowState) -> Option<Warp> {
        if bookmark.chunk_offset == window.offset() && !window.is_loading() {
            return Some(Warp::Scroll {
                line: bookmark.line_num,
            });
        }

        let ticket = window.seek(bookmark.chunk_offset)?;
        debug!(
            line = bookmark.line_num,
            offset = bookmark.chunk_offset,
            "warp requires re-seek"
        );
        Some(Warp::Seek {
            ticket,
            line: bookmark.line_num,
        })
    }
}
