//! `lw paste`: view clipboard or stdin text as if it were a file.

use std::io::Read;

use anyhow::{Context, Result};

use super::shared;
use crate::cli::{AppContext, PasteArgs};
use crate::infra::config::load_config;

pub fn run(
    args: PasteArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let text = if args.stdin
    {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    }
    else
    {
        read_clipboard()?
    };

    if text.is_empty()
    {
        anyhow::bail!("Nothing to view: pasted content is empty");
    }

    let cfg = load_config()?;
    let store = shared::open_store(&cfg, ctx);
    let mut session = shared::new_session(&cfg);

    let meta = session.load_text(text);
    shared::remember(&store, &cfg, &meta);

    shared::apply_position(&mut session, &args.position);
    shared::settle(&mut session)?;
    shared::apply_display(&mut session, &args.display, &cfg);

    shared::print_window(&session, &args.display, false, &cfg, ctx)
}

fn read_clipboard() -> Result<String>
{
    use arboard::Clipboard;

    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .get_text()
        .context("Clipboard has no text")
}
