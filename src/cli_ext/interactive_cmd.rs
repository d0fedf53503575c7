//! `lw interactive`: a line-oriented viewer over one file.
//!
//! Each input line is one command. After every command the loop waits for
//! the newest read, consumes any deferred warp scroll, and redraws.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::render::{self, RenderOptions};
use super::shared;
use crate::cli::{AppContext, InteractiveArgs};
use crate::core::bookmarks::Toggle;
use crate::core::chunk::ChunkReader;
use crate::core::line_ref::{self, LineRef};
use crate::core::persist::{JsonFileStore, load_bookmarks, save_bookmarks};
use crate::core::search::SearchQuery;
use crate::core::session::Session;
use crate::infra::config::{Config, load_config};

const HELP: &str = "\
commands:
  seek N      jump to byte offset N
  % P         jump to P percent of the file
  line N      jump near line ~N
  n / p       next / previous window
  /TERM       search (empty clears)
  re PATTERN  regex search
  next, prev  move between matches
  bm N        toggle bookmark on line ~N
  warp N      jump to bookmark ~N
  marks       list bookmarks
  focus       show only matching lines (toggle)
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command
{
    Seek(u64),
    Percent(f64),
    Line(u64),
    PageForward,
    PageBack,
    Search(String),
    Regex(String),
    NextMatch,
    PrevMatch,
    Bookmark(u64),
    Warp(u64),
    Marks,
    Focus,
    Help,
    Quit,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError
{
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArg(&'static str),
    #[error("`{0}` is not a number")]
    BadNumber(String),
}

fn number<T: std::str::FromStr>(
    cmd: &'static str,
    arg: Option<&str>,
) -> Result<T, ParseError>
{
    let raw = arg.ok_or(ParseError::MissingArg(cmd))?;
    // Accept line numbers exactly as they are printed
    let raw = raw.trim_start_matches('~');
    raw.parse()
        .map_err(|_| ParseError::BadNumber(raw.to_string()))
}

impl Command
{
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(input: &str) -> Result<Option<Self>, ParseError>
    {
        let input = input.trim();
        if input.is_empty()
        {
            return Ok(None);
        }
        if let Some(term) = input.strip_prefix('/')
        {
            return Ok(Some(Command::Search(term.to_string())));
        }

        let (head, rest) = match input.split_once(char::is_whitespace)
        {
            Some((h, r)) => (h, Some(r.trim())),
            None => (input, None),
        };

        let cmd = match head
        {
            "seek" | "s" => Command::Seek(number("seek", rest)?),
            "%" | "pct" => Command::Percent(number("%", rest)?),
            "line" | "l" => Command::Line(number("line", rest)?),
            "n" => Command::PageForward,
            "p" => Command::PageBack,
            "re" => Command::Regex(
                rest.ok_or(ParseError::MissingArg("re"))?
                    .to_string(),
            ),
            "next" => Command::NextMatch,
            "prev" => Command::PrevMatch,
            "bm" => Command::Bookmark(number("bm", rest)?),
            "warp" | "w" => Command::Warp(number("warp", rest)?),
            "marks" => Command::Marks,
            "focus" => Command::Focus,
            "help" | "?" => Command::Help,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(ParseError::Unknown(other.to_string())),
        };
        Ok(Some(cmd))
    }
}

pub struct Viewer
{
    session: Session,
    store: JsonFileStore,
    source_name: String,
    config: Config,
    page_lines: usize,
    /// Local index of the first line drawn.
    top: usize,
    opts: RenderOptions,
    prompt: bool,
}

impl Viewer
{
    pub fn new(
        session: Session,
        store: JsonFileStore,
        config: Config,
        page_lines: usize,
        opts: RenderOptions,
    ) -> Self
    {
        let source_name = session
            .meta()
            .map(|m| m.name)
            .unwrap_or_default();
        Self { session, store, source_name, config, page_lines, top: 0, opts, prompt: false }
    }

    pub fn with_prompt(
        mut self,
        prompt: bool,
    ) -> Self
    {
        self.prompt = prompt;
        self
    }

    pub fn session(&self) -> &Session
    {
        &self.session
    }

    /// Runs commands from `input` until `quit` or end of input.
    pub fn run(
        &mut self,
        input: impl BufRead,
        mut out: impl Write,
    ) -> Result<()>
    {
        self.draw(&mut out)?;

        for line in input.lines()
        {
            let line = line.context("Failed to read command")?;
            let cmd = match Command::parse(&line)
            {
                Ok(Some(Command::Quit)) => break,
                Ok(Some(cmd)) => cmd,
                Ok(None) =>
                {
                    self.write_prompt(&mut out)?;
                    continue;
                }
                Err(e) =>
                {
                    writeln!(out, "? {e}")?;
                    self.write_prompt(&mut out)?;
                    continue;
                }
            };

            debug!(?cmd, "command");
            let redraw = !matches!(cmd, Command::Help | Command::Marks);
            let message = self.execute(cmd);
            self.settle();

            if let Some(msg) = message
            {
                writeln!(out, "{msg}")?;
            }
            if redraw
            {
                self.draw(&mut out)?;
            }
            else
            {
                self.write_prompt(&mut out)?;
            }
        }
        out.flush()?;
        Ok(())
    }

    /// Applies one command; returns a status message to print.
    pub fn execute(
        &mut self,
        cmd: Command,
    ) -> Option<String>
    {
        match cmd
        {
            Command::Seek(offset) =>
            {
                self.top = 0;
                self.session.seek(offset);
                None
            }
            Command::Percent(pct) =>
            {
                self.top = 0;
                self.session.seek_percentage(pct);
                None
            }
            Command::Line(line) =>
            {
                self.top = 0;
                self.session.seek_line(line);
                None
            }
            Command::PageForward =>
            {
                self.top = 0;
                self.session.page_forward();
                None
            }
            Command::PageBack =>
            {
                self.top = 0;
                self.session.page_back();
                None
            }
            Command::Search(term) => self.search(term, false),
            Command::Regex(term) => self.search(term, true),
            Command::NextMatch =>
            {
                let hit = self.session.next_match();
                self.scroll_to_match(hit)
            }
            Command::PrevMatch =>
            {
                let hit = self.session.prev_match();
                self.scroll_to_match(hit)
            }
            Command::Bookmark(line) => Some(self.toggle_bookmark(line)),
            Command::Warp(line) => self.warp(line),
            Command::Marks => Some(self.marks()),
            Command::Focus =>
            {
                let focus = !self.session.focus();
                self.session.set_focus(focus);
                Some(format!("focus {}", if focus { "on" } else { "off" }))
            }
            Command::Help => Some(HELP.to_string()),
            Command::Quit => None,
        }
    }

    /// Waits for the newest read and consumes a deferred warp scroll.
    fn settle(&mut self)
    {
        self.session.wait();
        if let Some(line) = self.session.take_pending_scroll()
        {
            self.scroll_to_line(line);
        }
    }

    fn scroll_to_line(
        &mut self,
        line: u64,
    )
    {
        let window = self.session.window();
        if let Some(local) = line_ref::to_local(window.offset(), line, window.lines().len())
        {
            self.top = local;
        }
    }

    fn scroll_to_match(
        &mut self,
        hit: Option<LineRef>,
    ) -> Option<String>
    {
        match hit
        {
            Some(line) =>
            {
                self.scroll_to_line(line.number());
                Some(format!("match at {line}"))
            }
            None => Some("no matches in this window".to_string()),
        }
    }

    fn search(
        &mut self,
        term: String,
        regex: bool,
    ) -> Option<String>
    {
        self.top = 0;
        let query = SearchQuery {
            use_regex: regex || self.config.search.regex,
            case_sensitive: self.config.search.case_sensitive,
            term,
        };
        self.session.set_search(query);

        let search = self.session.search();
        if let Some(err) = search.error()
        {
            return Some(format!("bad pattern: {err}"));
        }
        if !search.has_term()
        {
            return Some("search cleared".to_string());
        }
        Some(format!("{} matches", search.matches().len()))
    }

    fn toggle_bookmark(
        &mut self,
        line: u64,
    ) -> String
    {
        let window = self.session.window();
        let Some(local) = line_ref::to_local(window.offset(), line, window.lines().len())
        else
        {
            return format!("~{line} is not in this window");
        };
        let Some(toggle) = self.session.toggle_bookmark(local)
        else
        {
            return format!("~{line} is not in this window");
        };

        if let Err(e) = save_bookmarks(&self.store, &self.source_name, self.session.bookmarks())
        {
            warn!(error = %e, "could not save bookmarks");
        }
        match toggle
        {
            Toggle::Added => format!("bookmarked ~{line}"),
            Toggle::Removed => format!("removed bookmark ~{line}"),
        }
    }

    fn warp(
        &mut self,
        line: u64,
    ) -> Option<String>
    {
        match self.session.warp_to(line)
        {
            Some(now) =>
            {
                self.scroll_to_line(now);
                None
            }
            // Scroll happens in `settle` once the window lands
            None if self.session.bookmarks().contains(line) => None,
            None => Some(format!("no bookmark on ~{line}")),
        }
    }

    fn marks(&self) -> String
    {
        let marks = self.session.bookmarks();
        if marks.is_empty()
        {
            return "no bookmarks".to_string();
        }
        marks
            .list()
            .map(|b| format!("{:>9}  {}", LineRef(b.line_num).to_string(), b.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn draw(
        &self,
        out: &mut impl Write,
    ) -> Result<()>
    {
        let frame = self.session.frame();
        if self.opts.header
        {
            render::write_header(out, &frame, &self.opts)?;
        }
        for line in frame
            .lines
            .iter()
            .filter(|l| l.local >= self.top)
            .take(self.page_lines)
        {
            render::write_line(out, line, self.session.search(), &self.opts)?;
        }
        self.write_prompt(out)
    }

    fn write_prompt(
        &self,
        out: &mut impl Write,
    ) -> Result<()>
    {
        if self.prompt
        {
            write!(out, "lw> ")?;
            out.flush()?;
        }
        Ok(())
    }
}

pub fn run(
    args: InteractiveArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let cfg = load_config()?;
    let store = shared::open_store(&cfg, ctx);
    let reader = ChunkReader::new(cfg.view.decoding);
    let mut session = if args.inline
    {
        Session::new(reader)
    }
    else
    {
        Session::with_background_loader(reader).context("Failed to start reader thread")?
    };

    let meta = session
        .load_file(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    shared::remember(&store, &cfg, &meta);
    if let Some(marks) = load_bookmarks(&store, &meta.name).context("Failed to load bookmarks")?
    {
        session.restore_bookmarks(marks);
    }
    session.wait();

    let stdin = io::stdin();
    let opts = RenderOptions {
        color: !ctx.no_color && io::stdout().is_terminal(),
        header: !ctx.quiet,
        levels: cfg.view.show_level,
        expand_json: cfg.view.expand_json,
    };
    let prompt = stdin.is_terminal() && !ctx.quiet;

    let mut viewer = Viewer::new(session, store, cfg, args.page_lines, opts).with_prompt(prompt);
    viewer.run(stdin.lock(), io::stdout().lock())
}
