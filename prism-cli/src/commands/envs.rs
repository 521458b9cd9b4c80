//! `prism envs` — show the merged variable scope of every environment.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use prism_batch::pipeline::load_environments;
use prism_core::{environment::environment_dir_at, EnvName, VariableScope};

/// Arguments for `prism envs`.
#[derive(Args, Debug)]
pub struct EnvsArgs {
    /// Emit the full merged scopes as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct EnvsJson<'a> {
    shared: &'a VariableScope,
    environments: &'a BTreeMap<EnvName, VariableScope>,
}

#[derive(Tabled)]
struct EnvRow {
    #[tabled(rename = "ENVIRONMENT")]
    name: String,
    #[tabled(rename = "KEYS")]
    key_count: usize,
    #[tabled(rename = "VARIABLES")]
    keys: String,
}

impl EnvsArgs {
    pub fn run(self, workspace: &Path) -> Result<ExitCode> {
        let (root, set) = load_environments(workspace)
            .with_context(|| format!("failed to load environments for '{}'", workspace.display()))?;

        if self.json {
            let payload = EnvsJson {
                shared: &set.shared,
                environments: &set.scopes,
            };
            println!("{}", serde_json::to_string_pretty(&payload)?);
            return Ok(ExitCode::SUCCESS);
        }

        if set.is_empty() {
            println!(
                "No environments found in '{}'.",
                environment_dir_at(&root).display()
            );
            return Ok(ExitCode::SUCCESS);
        }

        let rows: Vec<EnvRow> = set
            .iter()
            .map(|(name, scope)| EnvRow {
                name: name.to_string(),
                key_count: scope.len(),
                keys: scope.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>().join(", "),
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
        Ok(ExitCode::SUCCESS)
    }
}
