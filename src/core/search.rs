//! Search over the lines of the current window.
//!
//! Matching runs only against the loaded window; match positions are local
//! indices and are recomputed whenever the window's lines or the query
//! change. An invalid pattern degrades to zero matches and never fails the
//! caller.

use std::ops::Range;

use memchr::memmem;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub term: String,
    pub use_regex: bool,
    pub case_sensitive: bool,
}

impl SearchQuery {
    pub fn literal(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Self::default()
        }
    }

    pub fn pattern(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            use_regex: true,
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }
}

/// Compiled form of a query.
#[derive(Debug, Clone)]
enum Matcher {
    /// Empty term; nothing matches.
    Empty,
    /// Case-sensitive literal, searched bytewise.
    Exact(memmem::Finder<'static>),
    /// Case-folded literals and all patterns.
    Regex(Regex),
    /// Pattern failed to compile.
    Invalid(String),
}

impl Matcher {
    fn compile(query: &SearchQuery) -> Self {
        if query.term.is_empty() {
            return Matcher::Empty;
        }
        if !query.use_regex && query.case_sensitive {
            return Matcher::Exact(memmem::Finder::new(query.term.as_bytes()).into_owned());
        }

        let source = if query.use_regex {
            query.term.clone()
        } else {
            regex::escape(&query.term)
        };
        match RegexBuilder::new(&source)
            .case_insensitive(!query.case_sensitive)
            .build()
        {
            Ok(re) => Matcher::Regex(re),
            Err(e) => {
                debug!(term = %query.term, error = %e, "search pattern did not compile");
                Matcher::Invalid(e.to_string())
            }
        }
    }

    fn is_match(&self, line: &str) -> bool {
        match self {
            Matcher::Empty | Matcher::Invalid(_) => false,
            Matcher::Exact(f) => f.find(line.as_bytes()).is_some(),
            Matcher::Regex(re) => re.is_match(line),
        }
    }

    fn ranges(&self, line: &str) -> Vec<Range<usize>> {
        match self {
            Matcher::Empty | Matcher::Invalid(_) => Vec::new(),
            Matcher::Exact(f) => {
                let n = f.needle().len();
                f.find_iter(line.as_bytes()).map(|s| s..s + n).collect()
            }
            Matcher::Regex(re) => re
                .find_iter(line)
                .filter(|m| !m.is_empty())
                .map(|m| m.range())
                .collect(),
        }
    }
}

/// Local indices of every line matching `query`, ascending.
pub fn compute_matches(lines: &[String], query: &SearchQuery) -> Vec<usize> {
    let matcher = Matcher::compile(query);
    matching_indices(lines, &matcher)
}

fn matching_indices(lines: &[String], matcher: &Matcher) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .filter(|(_, l)| matcher.is_match(l))
        .map(|(i, _)| i)
        .collect()
}

/// Smallest match after `cursor`, wrapping to the first.
pub fn next_match(matches: &[usize], cursor: Option<usize>) -> Option<usize> {
    let first = *matches.first()?;
    let Some(cur) = cursor else {
        return Some(first);
    };
    let i = matches.partition_point(|&m| m <= cur);
    Some(matches.get(i).copied().unwrap_or(first))
}

/// Largest match before `cursor`, wrapping to the last.
pub fn prev_match(matches: &[usize], cursor: Option<usize>) -> Option<usize> {
    let last = *matches.last()?;
    let Some(cur) = cursor else {
        return Some(last);
    };
    let i = matches.partition_point(|&m| m < cur);
    Some(if i == 0 { last } else { matches[i - 1] })
}

/// Query, its compiled matcher, and the matches in the current window.
#[derive(Debug, Clone)]
pub struct SearchState {
    query: SearchQuery,
    matcher: Matcher,
    matches: Vec<usize>,
    cursor: Option<usize>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: SearchQuery::default(),
            matcher: Matcher::Empty,
            matches: Vec::new(),
            cursor: None,
        }
    }
}

impl SearchState {
    pub fn query(&self) -> &SearchQuery {
        &self.query
    }

    pub fn has_term(&self) -> bool {
        !self.query.term.is_empty()
    }

    pub fn matches(&self) -> &[usize] {
        &self.matches
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Compile error for the current pattern, if any.
    pub fn error(&self) -> Option<&str> {
        match &self.matcher {
            Matcher::Invalid(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_match(&self, local_index: usize) -> bool {
        self.matches.binary_search(&local_index).is_ok()
    }

    /// Replaces the query and recomputes against `lines`.
    pub fn set_query(&mut self, query: SearchQuery, lines: &[String]) {
        if query != self.query {
            self.matcher = Matcher::compile(&query);
            self.query = query;
        }
        self.recompute(lines);
    }

    /// Recomputes matches for new window lines. Resets the cursor.
    pub fn recompute(&mut self, lines: &[String]) {
        self.matches = matching_indices(lines, &self.matcher);
        self.cursor = None;
    }

    /// Advances the cursor to the next match (wrapping).
    pub fn next(&mut self) -> Option<usize> {
        self.cursor = next_match(&self.matches, self.cursor);
        self.cursor
    }

    /// Moves the cursor to the previous match (wrapping).
    pub fn prev(&mut self) -> Option<usize> {
        self.cursor = prev_match(&self.matches, self.cursor);
        self.cursor
    }

    /// Byte ranges of every occurrence in `line`, for highlighting.
    pub fn highlight_ranges(&self, line: &str) -> Vec<Range<usize>> {
        self.matcher.ranges(line)
    }

    /// Indices to display: only matches in focus mode with a term, else all.
    pub fn visible_indices(&self, line_count: usize, focus: bool) -> Vec<usize> {
        if focus && self.has_term() {
            self.matches.clone()
        } else {
            (0..line_count).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn literal_is_case_folded_by_default() {
        let l = lines(&["2024 error: db down", "ok", "ERROR again"]);
        assert_eq!(compute_matches(&l, &SearchQuery::literal("ERROR")), vec![0, 2]);
    }

    #[test]
    fn case_sensitive_literal() {
        let l = lines(&["2024 error: db down", "ok", "ERROR again"]);
        let q = SearchQuery::literal("ERROR").case_sensitive(true);
        assert_eq!(compute_matches(&l, &q), vec![2]);
    }

    #[test]
    fn literal_treats_regex_metacharacters_verbatim() {
        let l = lines(&["a.b", "axb", "(x)"]);
        assert_eq!(compute_matches(&l, &SearchQuery::literal("a.b")), vec![0]);
        assert_eq!(compute_matches(&l, &SearchQuery::literal("(x")), vec![2]);
    }

    #[test]
    fn pattern_mode() {
        let l = lines(&["took 15ms", "took 2s", "idle"]);
        assert_eq!(compute_matches(&l, &SearchQuery::pattern(r"\d+ms")), vec![0]);
    }

    #[test]
    fn invalid_pattern_is_zero_matches() {
        let l = lines(&["(", "x"]);
        let mut s = SearchState::default();
        s.set_query(SearchQuery::pattern("("), &l);
        assert!(s.matches().is_empty());
        assert!(s.error().is_some());
        assert_eq!(s.next(), None);
    }

    #[test]
    fn empty_term_matches_nothing() {
        let l = lines(&["a", "b"]);
        assert!(compute_matches(&l, &SearchQuery::literal("")).is_empty());
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let m = [2, 5, 9];
        assert_eq!(next_match(&m, Some(9)), Some(2));
        assert_eq!(prev_match(&m, Some(2)), Some(9));
        assert_eq!(next_match(&m, Some(2)), Some(5));
        assert_eq!(prev_match(&m, Some(9)), Some(5));
        assert_eq!(next_match(&m, Some(3)), Some(5));
        assert_eq!(prev_match(&m, Some(6)), Some(5));
        assert_eq!(next_match(&m, None), Some(2));
        assert_eq!(prev_match(&m, None), Some(9));
        assert_eq!(next_match(&[], Some(1)), None);
        assert_eq!(prev_match(&[], None), None);
    }

    #[test]
    fn changing_term_resets_cursor() {
        let l = lines(&["warn a", "warn b"]);
        let mut s = SearchState::default();
        s.set_query(SearchQuery::literal("warn"), &l);
        assert_eq!(s.next(), Some(0));
        assert_eq!(s.next(), Some(1));
        s.set_query(SearchQuery::literal("b"), &l);
        assert_eq!(s.cursor(), None);
        assert_eq!(s.matches(), &[1]);
    }

    #[test]
    fn highlight_ranges_cover_every_occurrence() {
        let mut s = SearchState::default();
        s.set_query(SearchQuery::literal("ab"), &[]);
        assert_eq!(s.highlight_ranges("xABab"), vec![1..3, 3..5]);

        s.set_query(SearchQuery::literal("ab").case_sensitive(true), &[]);
        assert_eq!(s.highlight_ranges("xABab"), vec![3..5]);
    }

    #[test]
    fn focus_only_narrows_with_a_term() {
        let l = lines(&["a", "b", "a"]);
        let mut s = SearchState::default();
        assert_eq!(s.visible_indices(3, true), vec![0, 1, 2]);
        s.set_query(SearchQuery::literal("a"), &l);
        assert_eq!(s.visible_indices(3, true), vec![0, 2]);
        assert_eq!(s.visible_indices(3, false), vec![0, 1, 2]);
    }
}
