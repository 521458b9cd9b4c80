//! Artifact writer for `out/<env>/...`.
//!
//! An artifact whose bytes already match the rendered text is left alone, so
//! repeated runs keep modification times stable. Anything else is staged in
//! `<path>.prism.tmp` next to the target and renamed over it, so readers
//! never see a half-written file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{io_err, BatchError};

/// Outcome of an individual artifact write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// Rendered content already matches what is on disk; nothing written.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }
}

/// Write `content` to `path` unless the file already holds exactly that.
pub fn write_artifact(path: &Path, content: &str, dry_run: bool) -> Result<WriteResult, BatchError> {
    let tmp = PathBuf::from(format!("{}.prism.tmp", path.display()));
    write_artifact_with_tmp(path, content, dry_run, &tmp)
}

fn write_artifact_with_tmp(
    path: &Path,
    content: &str,
    dry_run: bool,
    tmp: &Path,
) -> Result<WriteResult, BatchError> {
    if read_existing(path)?.as_deref() == Some(content.as_bytes()) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    replace_via(tmp, path, content)?;

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}

/// Stage `content` in `staging` and rename it onto `target`. The staging file
/// is removed when the rename fails.
fn replace_via(staging: &Path, target: &Path, content: &str) -> Result<(), BatchError> {
    std::fs::write(staging, content).map_err(|e| io_err(staging, e))?;
    std::fs::rename(staging, target).map_err(|e| {
        let _ = std::fs::remove_file(staging);
        io_err(target, e)
    })
}

/// Current bytes of `path`, or `None` if it does not exist.
pub(crate) fn read_existing(path: &Path) -> Result<Option<Vec<u8>>, BatchError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
