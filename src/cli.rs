use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    pub quiet: bool,                // global --quiet
    pub no_color: bool,             // global --no-color
    pub verbose: bool,              // global --verbose
    pub state_dir: Option<PathBuf>, // global --state-dir
}

#[derive(Parser)]
#[command(name = "lw")]
#[command(about = "Jump around huge log files one 50 KB window at a time")]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress headers and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log core activity to stderr (same as LOGWARP_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding history and bookmark state
    #[arg(long, global = true, value_name = "DIR")]
    pub state_dir: Option<PathBuf>,
}

impl Cli {
    pub fn context(&self) -> AppContext {
        AppContext {
            quiet: self.quiet,
            no_color: self.no_color,
            verbose: self.verbose,
            state_dir: self.state_dir.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print one window of a log file
    View(ViewArgs),

    /// View clipboard or stdin content as a log
    Paste(PasteArgs),

    /// Manage persisted bookmarks for a file
    Bookmark(BookmarkArgs),

    /// Show recently opened files
    History(HistoryArgs),

    /// Line-oriented viewer with seek, search and bookmarks
    Interactive(InteractiveArgs),

    /// Initialize a logwarp.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Where the window starts. At most one may be given.
#[derive(Args, Debug, Clone, Default)]
#[group(multiple = false)]
pub struct PositionArgs {
    /// Byte offset to seek to
    #[arg(long)]
    pub offset: Option<u64>,

    /// Percentage of the file to seek to (0-100)
    #[arg(long, value_name = "PERCENT")]
    pub percent: Option<f64>,

    /// Approximate line number to seek to
    #[arg(long)]
    pub line: Option<u64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct DisplayArgs {
    /// Search term highlighted in the window
    #[arg(short, long)]
    pub search: Option<String>,

    /// Treat the search term as a regular expression
    #[arg(long)]
    pub regex: bool,

    /// Match case exactly
    #[arg(long)]
    pub case_sensitive: bool,

    /// Only print matching lines
    #[arg(long)]
    pub focus: bool,

    /// Prefix lines with their severity
    #[arg(long)]
    pub levels: bool,

    /// Pretty-print JSON embedded in lines
    #[arg(long)]
    pub expand_json: bool,

    /// Emit the rendered frame as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ViewArgs {
    /// Log file to open
    pub file: PathBuf,

    #[command(flatten)]
    pub position: PositionArgs,

    #[command(flatten)]
    pub display: DisplayArgs,

    /// Mark lines bookmarked in a previous session
    #[arg(long)]
    pub restore_bookmarks: bool,

    /// Print the severity minimap instead of lines
    #[arg(long)]
    pub minimap: bool,
}

#[derive(Parser, Debug)]
pub struct PasteArgs {
    /// Read from stdin instead of the system clipboard
    #[arg(long)]
    pub stdin: bool,

    #[command(flatten)]
    pub position: PositionArgs,

    #[command(flatten)]
    pub display: DisplayArgs,
}

#[derive(Parser, Debug)]
pub struct BookmarkArgs {
    /// Log file the bookmarks belong to
    pub file: PathBuf,

    #[command(subcommand)]
    pub action: BookmarkAction,
}

#[derive(Subcommand, Debug)]
pub enum BookmarkAction {
    /// Add a bookmark on a line, or remove it if present
    Toggle {
        /// Approximate line number (as printed after `~`)
        line: u64,

        /// Window the line was seen in (default: first window, else the line's estimated window)
        #[arg(long)]
        offset: Option<u64>,
    },

    /// List bookmarks in line order
    List {
        /// Emit JSON
        #[arg(long)]
        json: bool,
    },

    /// Load the window a bookmark was captured in and print around it
    Warp {
        line: u64,

        /// Lines of context printed on each side
        #[arg(short = 'C', long, default_value_t = 3)]
        context: usize,
    },

    /// Remove every bookmark for the file
    Clear,
}

#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Emit JSON
    #[arg(long)]
    pub json: bool,

    /// Forget all recent files
    #[arg(long)]
    pub clear: bool,
}

#[derive(Parser, Debug)]
pub struct InteractiveArgs {
    /// Log file to open
    pub file: PathBuf,

    /// Lines printed per screen
    #[arg(long, default_value_t = 20)]
    pub page_lines: usize,

    /// Run reads on the calling thread instead of a background reader
    #[arg(long)]
    pub inline: bool,
}

#[derive(Parser)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
