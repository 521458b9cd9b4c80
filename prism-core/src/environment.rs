//! Environment loading.
//!
//! # Storage layout
//!
//! ```text
//! <workspace>/
//!   environment/
//!     all.json     (shared scope, merged into every environment)
//!     dev.json     (environment `dev`)
//!     prod.json    (environment `prod`)
//! ```
//!
//! # Merge order
//!
//! 1. Every `<env>.json` is parsed into its own scope; `all.json` into the
//!    shared scope.
//! 2. `cs_project` / `cs_application` are written into the shared scope.
//! 3. The shared scope is written into every environment scope. Shared keys
//!    replace environment keys of the same name.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{io_err, EnvironmentError};
use crate::types::{EnvName, EnvironmentSet, ProjectIdentity, VariableScope};

/// Directory under the workspace root holding environment files.
pub const ENVIRONMENT_DIR: &str = "environment";
/// File holding values shared by every environment.
pub const SHARED_FILE: &str = "all.json";
/// Suffix of environment data files.
pub const DATA_SUFFIX: &str = ".json";
/// Injected key carrying [`ProjectIdentity::project`].
pub const PROJECT_KEY: &str = "cs_project";
/// Injected key carrying [`ProjectIdentity::application`].
pub const APPLICATION_KEY: &str = "cs_application";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<workspace>/environment/`. Pure, no I/O.
pub fn environment_dir_at(workspace: &Path) -> PathBuf {
    workspace.join(ENVIRONMENT_DIR)
}

// ---------------------------------------------------------------------------
// 2. Load
// ---------------------------------------------------------------------------

/// Load and merge the environment scopes of the workspace at `workspace`.
///
/// The identity keys are derived from the leaf of `workspace` as given, not
/// of its canonical form, so a symlinked workspace keeps the name it was
/// reached by.
pub fn load_workspace_scopes(workspace: &Path) -> Result<EnvironmentSet, EnvironmentError> {
    let identity = ProjectIdentity::from_workspace(workspace);
    load_scopes(&environment_dir_at(workspace), &identity)
}

/// Load every `*.json` file directly inside `environment_dir`.
///
/// A missing, non-directory or unlistable `environment_dir` is logged and
/// yields an empty set. Unreadable or malformed files abort the load with the
/// offending path.
pub fn load_scopes(
    environment_dir: &Path,
    identity: &ProjectIdentity,
) -> Result<EnvironmentSet, EnvironmentError> {
    if !environment_dir.is_dir() {
        tracing::warn!(
            "environment folder not found: {}",
            environment_dir.display()
        );
        return Ok(EnvironmentSet::default());
    }

    let files = match list_data_files(environment_dir) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(
                "environment folder unreadable: {}: {e}",
                environment_dir.display()
            );
            return Ok(EnvironmentSet::default());
        }
    };

    let mut set = EnvironmentSet::default();
    for (file_name, path) in files {
        if file_name == SHARED_FILE {
            set.shared.overlay(&read_scope(&path)?);
            continue;
        }
        let Some(stem) = file_name.strip_suffix(DATA_SUFFIX) else {
            continue;
        };
        if stem.is_empty() || stem.starts_with('.') {
            tracing::warn!("skipping environment file without a usable name: {}", path.display());
            continue;
        }
        let scope = read_scope(&path)?;
        tracing::debug!("loaded environment '{stem}' ({} keys)", scope.len());
        set.scopes.insert(EnvName::from(stem), scope);
    }

    set.shared.insert(PROJECT_KEY, identity.project.as_str());
    set.shared.insert(APPLICATION_KEY, identity.application.as_str());
    for scope in set.scopes.values_mut() {
        scope.overlay(&set.shared);
    }

    tracing::debug!(
        "using {} environment(s): {:?}",
        set.len(),
        set.scopes.keys().map(EnvName::as_str).collect::<Vec<_>>()
    );
    Ok(set)
}

/// Regular files ending in `.json`, sorted by name.
fn list_data_files(dir: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            tracing::warn!("skipping non-UTF-8 file name: {}", path.display());
            continue;
        };
        if name.ends_with(DATA_SUFFIX) {
            files.push((name, path));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

fn read_scope(path: &Path) -> Result<VariableScope, EnvironmentError> {
    let contents = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let map: Map<String, Value> =
        serde_json::from_str(&contents).map_err(|e| EnvironmentError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(VariableScope::from(map))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
