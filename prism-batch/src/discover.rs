//! Template discovery.
//!
//! [`discover`] walks the workspace depth-first and yields every file whose
//! name contains the template marker followed by an accepted extension
//! (`app.template.json`). Entries of each directory are visited in file-name
//! order. The `out/` directory at the workspace root is never descended, so
//! rendered artifacts are not picked up again.
//!
//! The walk is lazy: directories are listed and files read only as the
//! iterator is advanced. The first I/O error is yielded once and ends the
//! iteration.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{io_err, BatchError};
use crate::paths::OUT_DIR;

/// Infix marking a file as a template.
pub const TEMPLATE_MARKER: &str = ".template";

// ---------------------------------------------------------------------------
// TemplateMatcher
// ---------------------------------------------------------------------------

/// File-name filter for templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateMatcher {
    /// Accepted extensions after the marker, without the dot. Empty accepts
    /// any extension (`*.template.*`).
    pub extensions: Vec<String>,
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self {
            extensions: vec!["json".to_string()],
        }
    }
}

impl TemplateMatcher {
    /// Matcher accepting every `*.template.*` file.
    pub fn any_extension() -> Self {
        Self { extensions: Vec::new() }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        if self.extensions.is_empty() {
            return file_name.contains(&format!("{TEMPLATE_MARKER}."));
        }
        self.extensions
            .iter()
            .any(|ext| file_name.contains(&format!("{TEMPLATE_MARKER}.{ext}")))
    }
}

// ---------------------------------------------------------------------------
// TemplateUnit
// ---------------------------------------------------------------------------

/// One discovered template: absolute path plus raw source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateUnit {
    pub path: PathBuf,
    pub source: String,
}

impl TemplateUnit {
    /// Identity handed to the render engine.
    pub fn id(&self) -> String {
        self.path.display().to_string()
    }
}

// ---------------------------------------------------------------------------
// Walk
// ---------------------------------------------------------------------------

/// Lazily discover templates under `root`.
///
/// `root` should be absolute; yielded paths are `root` joined with the
/// relative location of each template.
pub fn discover(root: &Path, matcher: &TemplateMatcher) -> Templates {
    Templates {
        root: root.to_path_buf(),
        matcher: matcher.clone(),
        stack: vec![Entry {
            path: root.to_path_buf(),
            is_dir: true,
        }],
        done: false,
    }
}

struct Entry {
    path: PathBuf,
    is_dir: bool,
}

/// Iterator returned by [`discover`].
pub struct Templates {
    root: PathBuf,
    matcher: TemplateMatcher,
    stack: Vec<Entry>,
    done: bool,
}

impl Templates {
    fn push_children(&mut self, dir: &Path) -> Result<(), BatchError> {
        let mut children = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
            let entry = entry.map_err(|e| io_err(dir, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| io_err(&path, e))?;
            if file_type.is_dir() {
                if dir == self.root && entry.file_name() == OUT_DIR {
                    continue;
                }
                children.push(Entry { path, is_dir: true });
            } else if path.is_file() {
                children.push(Entry { path, is_dir: false });
            }
        }
        // Reverse order so the stack pops the smallest name first.
        children.sort_by(|a, b| b.path.file_name().cmp(&a.path.file_name()));
        self.stack.extend(children);
        Ok(())
    }

    fn is_template(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| self.matcher.matches(n))
    }

    fn advance(&mut self) -> Result<Option<TemplateUnit>, BatchError> {
        while let Some(entry) = self.stack.pop() {
            if entry.is_dir {
                self.push_children(&entry.path)?;
                continue;
            }
            if !self.is_template(&entry.path) {
                continue;
            }
            let source = fs::read_to_string(&entry.path).map_err(|e| io_err(&entry.path, e))?;
            tracing::debug!("discovered: {}", entry.path.display());
            return Ok(Some(TemplateUnit {
                path: entry.path,
                source,
            }));
        }
        Ok(None)
    }
}

impl Iterator for Templates {
    type Item = Result<TemplateUnit, BatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(unit)) => Some(Ok(unit)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
