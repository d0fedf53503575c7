// Window boundary scenarios against files with a known byte layout.
// Every line in the fixed-width fixture is 30 bytes, so the line at any
// offset is easy to predict.

mod util;

use logwarp::core::{
    CHUNK_SIZE, Completion, LoadStatus, LogSource, SearchQuery, WindowState,
    search::{SearchState, next_match, prev_match},
};
use util::{LINE_BYTES, fixed_width_log, fixture_line};

fn window_over(text: String) -> WindowState
{
    let mut w = WindowState::default();
    let ticket = w.load_source(LogSource::from_text("fixture.log", text).into_shared());
    let result = ticket.read(w.reader());
    assert_eq!(w.complete(ticket.token, result), Completion::Applied);
    w
}

// 4000 lines of 30 bytes = 120000 bytes, last line unterminated.
fn scenario_window() -> WindowState
{
    let text = fixed_width_log(4000, false);
    assert_eq!(text.len(), 120_000);
    window_over(text)
}

#[test]
fn first_window_keeps_leading_line_and_drops_cut_tail()
{
    let w = scenario_window();
    assert_eq!(w.offset(), 0);

    // 51200 / 30 = 1706 whole lines, then 20 bytes of line 1706
    let lines = w.lines();
    assert_eq!(lines.len(), 1706);
    assert_eq!(lines[0], fixture_line(0));
    assert_eq!(lines[1705], fixture_line(1705));
}

#[test]
fn middle_window_drops_both_partial_ends()
{
    let mut w = scenario_window();
    assert_eq!(w.seek_blocking(CHUNK_SIZE as u64), Some(Completion::Applied));

    let lines = w.lines();
    // Line 1706 straddles 51200 and must not appear as a fragment
    assert_eq!(lines.first(), Some(&fixture_line(1707)));
    assert_eq!(lines.last(), Some(&fixture_line(3412)));
    assert_eq!(lines.len(), 1706);
}

#[test]
fn final_window_keeps_unterminated_last_line()
{
    let mut w = scenario_window();
    assert_eq!(w.seek_blocking(2 * CHUNK_SIZE as u64), Some(Completion::Applied));

    let lines = w.lines();
    assert_eq!(lines.first(), Some(&fixture_line(3414)));
    let mut last = fixture_line(3999);
    last.push('!');
    assert_eq!(lines.last(), Some(&last));
    assert_eq!(lines.len(), 3999 - 3414 + 1);
}

#[test]
fn window_on_exact_line_start_still_drops_first_line()
{
    let mut w = window_over(fixed_width_log(100, true));
    w.seek_blocking((10 * LINE_BYTES) as u64);
    assert_eq!(w.lines().first(), Some(&fixture_line(11)));
}

#[test]
fn empty_source_is_an_empty_ready_window()
{
    let w = window_over(String::new());
    assert!(w.lines().is_empty());
    assert_eq!(w.percentage(), 0.0);
    assert_eq!(w.status(), &LoadStatus::Ready);
}

#[test]
fn percentage_tracks_offset()
{
    let mut w = scenario_window();
    let offset = w.offset_for_percentage(50.0);
    assert_eq!(offset, 60_000);
    w.seek_blocking(offset);
    assert_eq!(w.percentage(), 50.0);

    // Out-of-range inputs clamp
    assert_eq!(w.offset_for_percentage(250.0), 120_000);
    w.seek_blocking(500_000);
    assert_eq!(w.offset(), 119_999);
}

#[test]
fn case_insensitive_literal_search_matches()
{
    let lines = vec!["2024 error: db down".to_string(), "all fine".to_string()];
    let mut s = SearchState::default();
    s.set_query(SearchQuery::literal("ERROR"), &lines);
    assert_eq!(s.matches(), &[0]);

    s.set_query(SearchQuery::literal("ERROR").case_sensitive(true), &lines);
    assert!(s.matches().is_empty());
}

#[test]
fn match_navigation_wraps()
{
    let matches = [2, 5, 9];
    assert_eq!(next_match(&matches, Some(9)), Some(2));
    assert_eq!(prev_match(&matches, Some(2)), Some(9));
    assert_eq!(next_match(&matches, Some(5)), Some(9));
    assert_eq!(next_match(&[], Some(5)), None);
}
