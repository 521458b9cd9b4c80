//! `prism diff` — show unified diffs for what render would write.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use prism_batch::diff_workspace;

use super::{print_failures, TemplateArgs};
use crate::EXIT_PARTIAL;

/// Arguments for `prism diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    #[command(flatten)]
    pub templates: TemplateArgs,
}

impl DiffArgs {
    pub fn run(self, workspace: &Path) -> Result<ExitCode> {
        let options = self.templates.run_options(true);
        let result = diff_workspace(workspace, &options)
            .with_context(|| format!("diff failed for '{}'", workspace.display()))?;

        if result.diffs.is_empty() {
            println!("No differences for '{}'.", result.report.workspace.display());
        }
        for diff in &result.diffs {
            print!("{}", diff.unified_diff);
            if !diff.unified_diff.ends_with('\n') {
                println!();
            }
        }

        print_failures(&result.report);
        if result.report.has_failures() {
            return Ok(ExitCode::from(EXIT_PARTIAL));
        }
        Ok(ExitCode::SUCCESS)
    }
}
