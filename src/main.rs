use anyhow::Result;
use clap::Parser;
use logwarp::cli::{Cli, Commands};
use logwarp::cli_ext::{bookmark_cmd, history_cmd, interactive_cmd, paste_cmd, view_cmd};
use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

/// `LOGWARP_LOG` takes the usual EnvFilter syntax; `--verbose` overrides it.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("logwarp=debug")
    } else {
        EnvFilter::try_from_env("LOGWARP_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_timer(ChronoLocal::rfc_3339())
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Build a context once, pass everywhere
    let ctx = cli.context();

    match cli.command {
        Commands::View(args) => view_cmd::run(args, &ctx),
        Commands::Paste(args) => paste_cmd::run(args, &ctx),
        Commands::Bookmark(args) => bookmark_cmd::run(args, &ctx),
        Commands::History(args) => history_cmd::run(args, &ctx),
        Commands::Interactive(args) => interactive_cmd::run(args, &ctx),
        Commands::Init(args) => logwarp::infra::config::init(args, &ctx),
        Commands::Completions(args) => logwarp::completion::run(args, &ctx),
    }
}
