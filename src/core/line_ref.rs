//! Approximate file-wide line numbers.
//!
//! A line's global number is `floor(window_offset / AVG_BYTES_PER_LINE) +
//! local_index`. The constant is fixed rather than measured, so numbers are
//! stable and comparable within one loaded file but are not true ordinals.
//! They are always displayed with a `~` marker.

use serde::{Deserialize, Serialize};

/// Assumed average line length in bytes.
pub const AVG_BYTES_PER_LINE: u64 = 50;

/// Global number of the line at `local_index` in the window starting at `offset`.
#[inline]
pub fn to_global(offset: u64, local_index: usize) -> u64 {
    offset / AVG_BYTES_PER_LINE + local_index as u64
}

/// Seek offset whose window should contain `line`. Not guaranteed to.
#[inline]
pub fn from_global(line: u64) -> u64 {
    line.saturating_mul(AVG_BYTES_PER_LINE)
}

/// Local index of `line` in the window at `offset`, if it falls inside
/// a window of `len` lines.
pub fn to_local(offset: u64, line: u64, len: usize) -> Option<usize> {
    let base = offset / AVG_BYTES_PER_LINE;
    let local = usize::try_from(line.checked_sub(base)?).ok()?;
    (local < len).then_some(local)
}

/// A rendered line's approximate global number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineRef(pub u64);

impl LineRef {
    pub fn new(offset: u64, local_index: usize) -> Self {
        Self(to_global(offset, local_index))
    }

    pub fn number(self) -> u64 {
        self.0
    }

    /// Element id a front-end can scroll to.
    pub fn id(self) -> String {
        format!("line-{}", self.0)
    }
}

impl std::fmt::Display for LineRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "~{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_number_uses_floor_of_offset() {
        assert_eq!(to_global(0, 0), 0);
        assert_eq!(to_global(49, 3), 3);
        assert_eq!(to_global(51_200, 0), 1024);
        assert_eq!(to_global(102_400, 7), 2055);
    }

    #[test]
    fn from_global_round_trips_on_multiples() {
        assert_eq!(from_global(1024), 51_200);
        assert_eq!(to_global(from_global(1024), 0), 1024);
        assert_eq!(from_global(u64::MAX), u64::MAX);
    }

    #[test]
    fn to_local_inverts_within_window() {
        assert_eq!(to_local(51_200, 1024, 10), Some(0));
        assert_eq!(to_local(51_200, 1033, 10), Some(9));
        assert_eq!(to_local(51_200, 1034, 10), None);
        assert_eq!(to_local(51_200, 1023, 10), None);
    }

    #[test]
    fn line_ref_formats_with_marker_and_id() {
        let r = LineRef::new(100, 2);
        assert_eq!(r.to_string(), "~4");
        assert_eq!(r.id(), "line-4");
    }
}
