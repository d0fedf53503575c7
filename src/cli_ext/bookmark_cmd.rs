//! `lw bookmark`: persisted bookmarks for one file.
//!
//! Bookmarks are keyed by the file's name and carry the window offset they
//! were captured in, so `warp` can reload exactly that window.

use std::io::{self, Write};

use anyhow::{Context, Result, anyhow};
use owo_colors::OwoColorize;
use serde_json::json;

use super::shared;
use crate::cli::{AppContext, BookmarkAction, BookmarkArgs};
use crate::core::bookmarks::{BookmarkStore, Toggle};
use crate::core::line_ref::{self, LineRef};
use crate::core::persist::{load_bookmarks, save_bookmarks};
use crate::infra::config::load_config;

pub fn run(
    args: BookmarkArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let cfg = load_config()?;
    let store = shared::open_store(&cfg, ctx);
    let mut session = shared::new_session(&cfg);

    let meta = session
        .load_file(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let saved = load_bookmarks(&store, &meta.name)
        .context("Failed to load bookmarks")?
        .unwrap_or_default();
    session.restore_bookmarks(saved);

    match args.action
    {
        BookmarkAction::Toggle { line, offset } =>
        {
            let in_first_window = {
                let window = session.window();
                line_ref::to_local(window.offset(), line, window.lines().len()).is_some()
            };
            // Stay in the first window when the line is already there
            let target = match offset
            {
                Some(o) => Some(o),
                None if in_first_window => None,
                None => Some(line_ref::from_global(line)),
            };
            if let Some(o) = target
            {
                session.seek(o);
            }
            // Estimated windows may not match the one the line was read in
            if offset.is_none() && !ctx.quiet
            {
                if let Some(o) = target
                {
                    eprintln!(
                        "Using the window at offset {o}; pass --offset to toggle ~{line} in another window"
                    );
                }
            }
            shared::settle(&mut session)?;

            let window = session.window();
            let local = line_ref::to_local(window.offset(), line, window.lines().len())
                .ok_or_else(|| {
                    anyhow!("Line ~{line} is not in the window at offset {}", window.offset())
                })?;
            let toggle = session
                .toggle_bookmark(local)
                .ok_or_else(|| anyhow!("Line ~{line} is not in the window"))?;

            save_bookmarks(&store, &meta.name, session.bookmarks())
                .context("Failed to save bookmarks")?;

            if !ctx.quiet
            {
                let verb = match toggle
                {
                    Toggle::Added => "Added",
                    Toggle::Removed => "Removed",
                };
                if ctx.no_color
                {
                    println!("{verb} bookmark {}", LineRef(line));
                }
                else
                {
                    println!("{} {verb} bookmark {}", "✓".green(), LineRef(line));
                }
            }
            Ok(())
        }

        BookmarkAction::List { json } => list(session.bookmarks(), json, ctx),

        BookmarkAction::Warp { line, context } =>
        {
            let target = match session.warp_to(line)
            {
                Some(now) => now,
                None if session.bookmarks().contains(line) =>
                {
                    shared::settle(&mut session)?;
                    session
                        .take_pending_scroll()
                        .ok_or_else(|| anyhow!("Window for ~{line} did not load"))?
                }
                None => anyhow::bail!("No bookmark on line ~{line}"),
            };

            let window = session.window();
            let local = line_ref::to_local(window.offset(), target, window.lines().len())
                .ok_or_else(|| anyhow!("Line ~{target} is no longer in its window"))?;
            let from = local.saturating_sub(context);
            let to = (local + context + 1).min(window.lines().len());

            let mut out = io::stdout().lock();
            for (i, text) in window.lines()[from..to]
                .iter()
                .enumerate()
            {
                let idx = from + i;
                let marker = if idx == local { '>' } else { ' ' };
                let number = LineRef::new(window.offset(), idx).to_string();
                writeln!(out, "{marker} {number:>9}  {text}")?;
            }
            Ok(())
        }

        BookmarkAction::Clear =>
        {
            let removed = session
                .bookmarks()
                .len();
            save_bookmarks(&store, &meta.name, &BookmarkStore::new())
                .context("Failed to clear bookmarks")?;
            if !ctx.quiet
            {
                println!("Cleared {removed} bookmarks for {}", meta.name);
            }
            Ok(())
        }
    }
}

fn list(
    marks: &BookmarkStore,
    as_json: bool,
    ctx: &AppContext,
) -> Result<()>
{
    if as_json
    {
        let items: Vec<_> = marks
            .list()
            .map(|b| json!({ "line": b.line_num, "offset": b.chunk_offset, "content": b.content }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    if marks.is_empty()
    {
        if !ctx.quiet
        {
            println!("No bookmarks");
        }
        return Ok(());
    }

    for b in marks.list()
    {
        let number = LineRef(b.line_num).to_string();
        println!("{number:>9}  @{:<10} {}", b.chunk_offset, b.content);
    }
    Ok(())
}
