//! Dry-run unified diff support for `prism diff`.

use std::path::{Path, PathBuf};

use similar::TextDiff;

use crate::pipeline::{render_each, BatchReport, RunOptions};
use crate::writer::{read_existing, WriteResult};
use crate::BatchError;

/// A single rendered file diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Diff result for a workspace.
#[derive(Debug, Clone)]
pub struct DiffReport {
    pub report: BatchReport,
    pub diffs: Vec<FileDiff>,
}

/// Render what `render` would generate and compare it to current on-disk
/// artifacts.
///
/// No files are written. Failures are isolated exactly as in a real run and
/// end up in [`DiffReport::report`].
pub fn diff_workspace(workspace: &Path, options: &RunOptions) -> Result<DiffReport, BatchError> {
    let mut diffs = Vec::new();
    let report = render_each(workspace, options, |artifact| {
        let existing = read_existing(&artifact.path)?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
            .unwrap_or_default();
        if existing == artifact.content {
            return Ok(WriteResult::Unchanged {
                path: artifact.path.clone(),
            });
        }

        let relative = artifact
            .path
            .strip_prefix(artifact.workspace)
            .unwrap_or(artifact.path.as_path());
        diffs.push(FileDiff {
            path: artifact.path.clone(),
            unified_diff: unified_diff(&existing, &artifact.content, relative),
        });
        Ok(WriteResult::WouldWrite {
            path: artifact.path.clone(),
        })
    })?;

    Ok(DiffReport { report, diffs })
}

fn unified_diff(old: &str, new: &str, relative: &Path) -> String {
    let old_header = format!("a/{}", relative.display());
    let new_header = format!("b/{}", relative.display());
    TextDiff::from_lines(old, new)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string()
}
