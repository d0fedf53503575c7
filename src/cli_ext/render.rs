//! Terminal rendering of session frames.
//!
//! Everything here writes to a caller-supplied `Write` so command output and
//! snapshot tests go through the same code.

use std::io::{self, Write};

use owo_colors::OwoColorize;

use crate::core::level::{LogLevel, pretty_json};
use crate::core::search::SearchState;
use crate::core::session::{MinimapCell, MinimapKind, RenderFrame, RenderedLine};
use crate::core::window::LoadStatus;
use crate::infra::utils::SizeUtils;

/// Cells per minimap row.
const MINIMAP_WIDTH: usize = 64;

#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions
{
    pub color: bool,
    pub header: bool,
    pub levels: bool,
    pub expand_json: bool,
}

pub fn write_header(
    out: &mut impl Write,
    frame: &RenderFrame,
    opts: &RenderOptions,
) -> io::Result<()>
{
    let name = frame
        .source
        .as_deref()
        .unwrap_or("(no source)");
    let mut header = format!(
        "{name} @ {}/{} ({:.1}%) | {} bookmarks",
        frame.offset,
        SizeUtils::format_bytes(frame.total_bytes),
        frame.percentage,
        frame.bookmark_count,
    );

    if let Some(err) = &frame.search_error
    {
        header.push_str(&format!(" | bad pattern: {err}"));
    }
    else
    {
        header.push_str(&format!(" | {} matches", frame.match_count));
    }

    match &frame.status
    {
        LoadStatus::Loading => header.push_str(" | loading"),
        LoadStatus::Failed(msg) => header.push_str(&format!(" | read failed: {msg}")),
        LoadStatus::Idle | LoadStatus::Ready =>
        {}
    }

    if opts.color
    {
        writeln!(out, "{}", header.bold())
    }
    else
    {
        writeln!(out, "{header}")
    }
}

/// Writes the header (if enabled) and every rendered line.
pub fn write_frame(
    out: &mut impl Write,
    frame: &RenderFrame,
    search: &SearchState,
    opts: &RenderOptions,
) -> io::Result<()>
{
    if opts.header
    {
        write_header(out, frame, opts)?;
    }
    for line in &frame.lines
    {
        write_line(out, line, search, opts)?;
    }
    Ok(())
}

pub fn write_line(
    out: &mut impl Write,
    line: &RenderedLine,
    search: &SearchState,
    opts: &RenderOptions,
) -> io::Result<()>
{
    let mark = if line.is_bookmarked { '*' } else { ' ' };
    let cursor = if line.is_current { '>' } else { ' ' };
    let number = format!("{:>9}", line.global.to_string());

    let tag = match (opts.levels, line.level)
    {
        (false, _) | (true, LogLevel::Default) => String::new(),
        (true, level) => format!("[{level}] "),
    };

    let body = if opts.color && line.is_match
    {
        highlight(&line.text, search)
    }
    else
    {
        line.text
            .clone()
    };

    if opts.color
    {
        let tag = match line.level
        {
            LogLevel::Error => tag.red().to_string(),
            LogLevel::Warn => tag.yellow().to_string(),
            LogLevel::Info => tag.cyan().to_string(),
            LogLevel::Default => tag,
        };
        writeln!(out, "{}{} {}  {}{}", mark.magenta(), cursor.green(), number.dimmed(), tag, body)?;
    }
    else
    {
        writeln!(out, "{mark}{cursor} {number}  {tag}{body}")?;
    }

    if opts.expand_json
    {
        if let Some(pretty) = pretty_json(&line.text)
        {
            for json_line in pretty.lines()
            {
                writeln!(out, "{:13}{json_line}", "")?;
            }
        }
    }
    Ok(())
}

/// Marks every occurrence of the query in `text`.
fn highlight(
    text: &str,
    search: &SearchState,
) -> String
{
    let mut result = String::with_capacity(text.len() + 16);
    let mut last = 0;

    for range in search.highlight_ranges(text)
    {
        let (Some(before), Some(hit)) = (text.get(last..range.start), text.get(range.clone()))
        else
        {
            continue;
        };
        result.push_str(before);
        result.push_str(
            &hit.black()
                .on_yellow()
                .to_string(),
        );
        last = range.end;
    }

    result.push_str(text.get(last..).unwrap_or_default());
    result
}

fn minimap_glyph(kind: MinimapKind) -> char
{
    match kind
    {
        MinimapKind::Bookmarked => 'B',
        MinimapKind::Error => 'E',
        MinimapKind::Warn => 'W',
        MinimapKind::Info => 'I',
        MinimapKind::Default => '.',
    }
}

/// One glyph per window line, wrapped into fixed-width rows.
pub fn write_minimap(
    out: &mut impl Write,
    cells: &[MinimapCell],
    color: bool,
) -> io::Result<()>
{
    for row in cells.chunks(MINIMAP_WIDTH)
    {
        let mut text = String::with_capacity(row.len());
        for cell in row
        {
            let glyph = minimap_glyph(cell.kind);
            if !color
            {
                text.push(glyph);
                continue;
            }
            let painted = match cell.kind
            {
                MinimapKind::Bookmarked => glyph
                    .magenta()
                    .to_string(),
                MinimapKind::Error => glyph
                    .red()
                    .to_string(),
                MinimapKind::Warn => glyph
                    .yellow()
                    .to_string(),
                MinimapKind::Info => glyph
                    .cyan()
                    .to_string(),
                MinimapKind::Default => glyph
                    .dimmed()
                    .to_string(),
            };
            text.push_str(&painted);
        }
        let first = row
            .first()
            .map(|c| c.line.to_string())
            .unwrap_or_default();
        writeln!(out, "{first:>9} {text}")?;
    }
    Ok(())
}
