//! Shell completion generation using clap_complete.

use anyhow::{Context, Result};
use clap::CommandFactory;
use clap_complete::{Shell as CompletionShell, generate, generate_to};
use std::{fs, io};

use crate::cli::{AppContext, Cli, CompletionsArgs, Shell};

const BIN_NAME: &str = "lw";

impl From<Shell> for CompletionShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => CompletionShell::Bash,
            Shell::Zsh => CompletionShell::Zsh,
            Shell::Fish => CompletionShell::Fish,
            Shell::PowerShell => CompletionShell::PowerShell,
            Shell::Elvish => CompletionShell::Elvish,
        }
    }
}

/// Writes the completion script for `shell` to `out`.
pub fn write_script(shell: Shell, out: &mut impl io::Write) {
    generate(CompletionShell::from(shell), &mut Cli::command(), BIN_NAME, out);
}

pub fn run(args: CompletionsArgs, ctx: &AppContext) -> Result<()> {
    if args.stdout {
        write_script(args.shell, &mut io::stdout());
        return Ok(());
    }

    let Some(dir) = args.out_dir else {
        anyhow::bail!("--out-dir is required unless --stdout is set");
    };
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let path = generate_to(
        CompletionShell::from(args.shell),
        &mut Cli::command(),
        BIN_NAME,
        &dir,
    )
    .context("Failed to generate completion file")?;

    if !ctx.quiet {
        eprintln!("Wrote completion to {}", path.display());
    }
    Ok(())
}
