//! Output path mapping.
//!
//! ```text
//! <workspace>/services/api/config.template.json
//!   → <workspace>/out/<env>/services/api/config.json
//! ```
//!
//! Only the file name loses its marker; directory segments are copied as-is.

use std::path::{Path, PathBuf};

use prism_core::EnvName;

use crate::error::BatchError;

/// Directory under the workspace root receiving rendered artifacts.
pub const OUT_DIR: &str = "out";

const MARKER_INFIX: &str = ".template.";

/// `<workspace>/out/`. Pure, no I/O.
pub fn output_root_at(workspace: &Path) -> PathBuf {
    workspace.join(OUT_DIR)
}

/// Remove the first `.template.` infix from a file name.
///
/// `config.template.json` → `config.json`. Names without the infix are
/// returned unchanged.
pub fn strip_template_marker(file_name: &str) -> String {
    file_name.replacen(MARKER_INFIX, ".", 1)
}

/// Destination of `template` rendered for `env`.
///
/// Pure: the same inputs always give the same path and nothing is touched on
/// disk. Fails only when `template` is not under `workspace`.
pub fn map_output_path(
    workspace: &Path,
    template: &Path,
    env: &EnvName,
) -> Result<PathBuf, BatchError> {
    let outside = || BatchError::OutsideWorkspace {
        path: template.to_path_buf(),
        workspace: workspace.to_path_buf(),
    };
    let rel = template.strip_prefix(workspace).map_err(|_| outside())?;
    let file_name = rel
        .file_name()
        .map(|name| name.to_string_lossy())
        .ok_or_else(outside)?;

    let mut out = output_root_at(workspace).join(env.as_str());
    if let Some(parent) = rel.parent() {
        out.push(parent);
    }
    out.push(strip_template_marker(&file_name));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(name: &str) -> EnvName {
        EnvName::from(name)
    }

    #[test]
    fn strips_marker_from_file_name() {
        assert_eq!(strip_template_marker("config.template.json"), "config.json");
        assert_eq!(strip_template_marker("a.template.yaml"), "a.yaml");
        assert_eq!(strip_template_marker("plain.json"), "plain.json");
    }

    #[test]
    fn strips_only_first_marker() {
        assert_eq!(
            strip_template_marker("x.template.template.json"),
            "x.template.json"
        );
    }

    #[test]
    fn top_level_template() {
        let ws = PathBuf::from("/ws");
        let out = map_output_path(&ws, &ws.join("app.template.json"), &env("dev")).unwrap();
        assert_eq!(out, PathBuf::from("/ws/out/dev/app.json"));
    }

    #[test]
    fn nested_template_keeps_directories() {
        let ws = PathBuf::from("/ws");
        let tpl = ws.join("my.template.dir").join("svc").join("config.template.json");
        let out = map_output_path(&ws, &tpl, &env("prod")).unwrap();
        assert_eq!(
            out,
            PathBuf::from("/ws/out/prod/my.template.dir/svc/config.json"),
            "directory segments must not be stripped"
        );
    }

    #[test]
    fn mapping_is_deterministic() {
        let ws = PathBuf::from("/ws");
        let tpl = ws.join("a").join("b.template.json");
        let first = map_output_path(&ws, &tpl, &env("qa")).unwrap();
        let second = map_output_path(&ws, &tpl, &env("qa")).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn template_outside_workspace_is_rejected() {
        let err = map_output_path(
            Path::new("/ws"),
            Path::new("/elsewhere/a.template.json"),
            &env("dev"),
        )
        .unwrap_err();
        assert!(matches!(err, BatchError::OutsideWorkspace { .. }));
    }
}
