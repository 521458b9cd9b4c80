pub mod diff;
pub mod envs;
pub mod render;

use clap::Args;
use colored::Colorize;

use prism_batch::{BatchReport, RunOptions, TemplateMatcher};
use prism_renderer::EngineConfig;

/// Template selection and engine flags shared by `render` and `diff`.
#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    /// Accepted template extension after `.template.` (repeatable).
    #[arg(long = "ext", value_name = "EXT", default_value = "json")]
    pub extensions: Vec<String>,

    /// Accept every `*.template.*` file regardless of extension.
    #[arg(long, conflicts_with = "extensions")]
    pub any_ext: bool,

    /// HTML-escape values in `.html`, `.htm` and `.xml` templates.
    #[arg(long)]
    pub escape_html: bool,
}

impl TemplateArgs {
    pub fn run_options(&self, dry_run: bool) -> RunOptions {
        let matcher = if self.any_ext {
            TemplateMatcher::any_extension()
        } else {
            TemplateMatcher {
                extensions: self.extensions.clone(),
            }
        };
        let engine = EngineConfig {
            autoescape_suffixes: if self.escape_html {
                vec![".html", ".htm", ".xml"]
            } else {
                Vec::new()
            },
            ..EngineConfig::default()
        };
        RunOptions {
            dry_run,
            engine,
            matcher,
        }
    }
}

/// Print each isolated failure as a diagnostic block, then a summary line.
pub fn print_failures(report: &BatchReport) {
    for failure in &report.failures {
        eprintln!("{failure}");
    }
    if report.has_failures() {
        eprintln!(
            "{} {} failure(s): {} template(s) failed to compile, {} render(s) failed, {} write(s) failed",
            "✗".red(),
            report.failures.len(),
            report.templates_failed,
            report.renders_failed,
            report.failed_writes()
        );
    }
}
