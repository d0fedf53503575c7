//! Plumbing shared by the window-printing commands.

use std::io::{self, IsTerminal, Write};

use anyhow::{Context, Result};
use chrono::Local;
use tracing::warn;

use super::render::{self, RenderOptions};
use crate::cli::{AppContext, DisplayArgs, PositionArgs};
use crate::core::chunk::ChunkReader;
use crate::core::persist::{JsonFileStore, RecentFile, record_history};
use crate::core::session::Session;
use crate::core::source::SourceMeta;
use crate::core::window::LoadStatus;
use crate::infra::config::Config;

/// State store at the resolved location.
pub fn open_store(
    cfg: &Config,
    ctx: &AppContext,
) -> JsonFileStore
{
    JsonFileStore::new(
        cfg.state
            .resolve(ctx.state_dir.as_deref()),
    )
}

pub fn new_session(cfg: &Config) -> Session
{
    Session::new(ChunkReader::new(cfg.view.decoding))
}

/// Adds an opened source to the history. Failures are logged, not fatal.
pub fn remember(
    store: &JsonFileStore,
    cfg: &Config,
    meta: &SourceMeta,
)
{
    if !cfg
        .state
        .records_history()
    {
        return;
    }
    let entry = RecentFile::new(meta, Local::now().date_naive());
    if let Err(e) = record_history(store, entry)
    {
        warn!(error = %e, "could not record history");
    }
}

pub fn apply_position(
    session: &mut Session,
    position: &PositionArgs,
)
{
    if let Some(offset) = position.offset
    {
        session.seek(offset);
    }
    else if let Some(pct) = position.percent
    {
        session.seek_percentage(pct);
    }
    else if let Some(line) = position.line
    {
        session.seek_line(line);
    }
}

pub fn apply_display(
    session: &mut Session,
    display: &DisplayArgs,
    cfg: &Config,
)
{
    if let Some(term) = &display.search
    {
        session.set_search(
            cfg.search
                .query(term, display.regex, display.case_sensitive),
        );
    }
    session.set_focus(display.focus || cfg.search.focus);
}

/// Blocks for the newest read and turns a failed read into an error.
pub fn settle(session: &mut Session) -> Result<()>
{
    session.wait();
    if let LoadStatus::Failed(msg) = session
        .window()
        .status()
    {
        anyhow::bail!("Failed to read window: {msg}");
    }
    Ok(())
}

pub fn render_options(
    display: &DisplayArgs,
    cfg: &Config,
    ctx: &AppContext,
) -> RenderOptions
{
    RenderOptions {
        color: !ctx.no_color && io::stdout().is_terminal(),
        header: !ctx.quiet,
        levels: display.levels || cfg.view.show_level,
        expand_json: display.expand_json || cfg.view.expand_json,
    }
}

/// Prints the current window as text, JSON, or a minimap.
pub fn print_window(
    session: &Session,
    display: &DisplayArgs,
    minimap: bool,
    cfg: &Config,
    ctx: &AppContext,
) -> Result<()>
{
    let mut out = io::stdout().lock();
    let frame = session.frame();

    if display.json
    {
        serde_json::to_writer_pretty(&mut out, &frame).context("Failed to serialize frame")?;
        writeln!(out)?;
        return Ok(());
    }

    let opts = render_options(display, cfg, ctx);
    if minimap
    {
        if opts.header
        {
            render::write_header(&mut out, &frame, &opts)?;
        }
        render::write_minimap(&mut out, &session.minimap(), opts.color)?;
    }
    else
    {
        render::write_frame(&mut out, &frame, session.search(), &opts)?;
    }
    out.flush()?;
    Ok(())
}
