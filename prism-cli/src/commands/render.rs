//! `prism render` — render and write every (template, environment) pair.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use prism_batch::{pipeline, BatchReport, WriteResult};
use prism_core::environment::environment_dir_at;

use super::{print_failures, TemplateArgs};
use crate::EXIT_PARTIAL;

/// Arguments for `prism render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,

    #[command(flatten)]
    pub templates: TemplateArgs,
}

impl RenderArgs {
    pub fn run(self, workspace: &Path) -> Result<ExitCode> {
        let options = self.templates.run_options(self.dry_run);
        let report = pipeline::run(workspace, &options)
            .with_context(|| format!("render failed for '{}'", workspace.display()))?;

        print_results(&report, self.dry_run);
        print_failures(&report);

        if report.has_failures() {
            return Ok(ExitCode::from(EXIT_PARTIAL));
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn print_results(report: &BatchReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };

    if report.environments == 0 {
        println!(
            "{prefix}No environments found in '{}'; nothing rendered.",
            environment_dir_at(&report.workspace).display()
        );
        return;
    }

    let written = report
        .writes
        .iter()
        .filter(|r| {
            matches!(
                r,
                WriteResult::Written { .. } | WriteResult::WouldWrite { .. }
            )
        })
        .count();
    let unchanged = report
        .writes
        .iter()
        .filter(|r| matches!(r, WriteResult::Unchanged { .. }))
        .count();

    println!(
        "{prefix}{} {} template(s) × {} environment(s) ({} written, {} unchanged)",
        "✓".green(),
        report.templates_processed,
        report.environments,
        written,
        unchanged
    );

    for r in &report.writes {
        let marker = match r {
            WriteResult::Written { .. } => "✎",
            WriteResult::WouldWrite { .. } => "~",
            WriteResult::Unchanged { .. } => "·",
        };
        println!("  {marker}  {}", r.path().display());
    }
}
