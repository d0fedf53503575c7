use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use super::shared;
use crate::cli::{AppContext, HistoryArgs};
use crate::core::persist::{clear_history, load_history};
use crate::infra::config::load_config;

pub fn run(
    args: HistoryArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let cfg = load_config()?;
    let store = shared::open_store(&cfg, ctx);

    if args.clear
    {
        clear_history(&store).context("Failed to clear history")?;
        if !ctx.quiet
        {
            println!("History cleared");
        }
        return Ok(());
    }

    let recent = load_history(&store).context("Failed to read history")?;

    if args.json
    {
        println!("{}", serde_json::to_string_pretty(&recent)?);
        return Ok(());
    }

    if recent.is_empty()
    {
        if !ctx.quiet
        {
            println!("No recent files");
        }
        return Ok(());
    }

    let width = recent
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0);
    for r in &recent
    {
        let name = format!("{:<width$}", r.name);
        if ctx.no_color
        {
            println!("{name}  {:>10}  {}", r.size, r.date);
        }
        else
        {
            println!("{}  {:>10}  {}", name.bold(), r.size, r.date.dimmed());
        }
    }
    Ok(())
}
