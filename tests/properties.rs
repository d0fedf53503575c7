// Property tests for window and bookmark invariants.

mod util;

use logwarp::core::{BookmarkStore, LogSource, WindowState, line_ref};
use proptest::prelude::*;
use util::fixed_width_log;

fn loaded_window(text: String) -> WindowState
{
    let mut w = WindowState::default();
    let source = LogSource::from_text("prop.log", text).into_shared();
    let ticket = w.load_source(source);
    let result = ticket.read(w.reader());
    w.complete(ticket.token, result);
    w
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn seek_is_idempotent(offset in 0u64..120_000) {
        let mut w = loaded_window(fixed_width_log(4000, false));

        w.seek_blocking(offset);
        let first = (w.offset(), w.lines().to_vec(), w.status().clone());
        w.seek_blocking(offset);
        let second = (w.offset(), w.lines().to_vec(), w.status().clone());

        prop_assert_eq!(first, second);
    }

    #[test]
    fn window_never_starts_with_a_cut_line(offset in 1u64..120_000) {
        let mut w = loaded_window(fixed_width_log(4000, true));
        w.seek_blocking(offset);

        // Every kept line is a whole fixture line
        for line in w.lines() {
            prop_assert_eq!(line.len(), 29);
            prop_assert!(line.starts_with("line "));
        }
    }

    #[test]
    fn global_numbers_increase_with_local_index(offset in any::<u32>(), i in 0usize..10_000) {
        let offset = u64::from(offset);
        prop_assert!(line_ref::to_global(offset, i) < line_ref::to_global(offset, i + 1));
    }

    #[test]
    fn toggle_twice_is_identity(
        existing in proptest::collection::btree_set(0u64..500, 0..8),
        n in 0u64..500,
        content in ".{0,80}",
        o in any::<u64>(),
    ) {
        let mut store = BookmarkStore::new();
        for line in &existing {
            store.toggle(*line, "seed", 0);
        }
        let before = store.clone();

        store.toggle(n, &content, o);
        store.toggle(n, &content, o);
        prop_assert_eq!(store, before);
    }
}
