//! `lw view`: print one window of a file.

use anyhow::{Context, Result};
use tracing::instrument;

use super::shared;
use crate::cli::{AppContext, ViewArgs};
use crate::core::persist::load_bookmarks;
use crate::infra::config::load_config;

#[instrument(skip_all, fields(file = %args.file.display()))]
pub fn run(
    args: ViewArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let cfg = load_config()?;
    let store = shared::open_store(&cfg, ctx);
    let mut session = shared::new_session(&cfg);

    let meta = session
        .load_file(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    shared::remember(&store, &cfg, &meta);

    if args.restore_bookmarks
    {
        let saved = load_bookmarks(&store, &meta.name).context("Failed to load bookmarks")?;
        if let Some(marks) = saved
        {
            session.restore_bookmarks(marks);
        }
    }

    shared::apply_position(&mut session, &args.position);
    shared::settle(&mut session)?;
    shared::apply_display(&mut session, &args.display, &cfg);

    shared::print_window(&session, &args.display, args.minimap, &cfg, ctx)
}
