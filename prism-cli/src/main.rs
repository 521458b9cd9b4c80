//! Prism — render workspace templates once per environment.
//!
//! # Usage
//!
//! ```text
//! prism [-w <workspace>] render [--dry-run] [--ext <EXT>]... [--any-ext] [--escape-html]
//! prism [-w <workspace>] diff [--ext <EXT>]... [--any-ext] [--escape-html]
//! prism [-w <workspace>] envs [--json]
//! ```
//!
//! # Exit status
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | every pair rendered (or there was nothing to render)      |
//! | 1    | fatal error: workspace, environment data or discovery     |
//! | 2    | batch completed with isolated compile/render/write errors |

mod commands;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};

use commands::{diff::DiffArgs, envs::EnvsArgs, render::RenderArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "prism",
    version,
    about = "Render workspace templates once per environment",
    long_about = None,
)]
struct Cli {
    /// Workspace root containing templates and the `environment/` folder.
    #[arg(
        long,
        short = 'w',
        global = true,
        env = "PRISM_WORKSPACE",
        default_value = "."
    )]
    workspace: PathBuf,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every template for every environment into `out/<env>/`.
    Render(RenderArgs),

    /// Show unified diff of what render would write.
    Diff(DiffArgs),

    /// Show the merged variable scope of each environment.
    Envs(EnvsArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

/// Exit code for a batch that finished with isolated failures.
pub(crate) const EXIT_PARTIAL: u8 = 2;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);
    match cli.command {
        Commands::Render(args) => args.run(&cli.workspace),
        Commands::Diff(args) => args.run(&cli.workspace),
        Commands::Envs(args) => args.run(&cli.workspace),
    }
}
