//! Domain types for Prism workspaces.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.
//! Variable values are kept as `serde_json::Value` so they reach the template
//! engine exactly as they were written in the environment files.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed environment name (`dev`, `prod`, ...).
///
/// Derived from an environment file name with the `.json` suffix removed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnvName(pub String);

impl EnvName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EnvName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EnvName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EnvName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// VariableScope
// ---------------------------------------------------------------------------

/// Mapping from variable name to JSON value, used for one render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariableScope(Map<String, Value>);

impl VariableScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert a value, returning the previous one for `key` if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Write every key of `shared` into `self`.
    ///
    /// Shared values replace environment values of the same name: the
    /// environment file is read first and the shared scope is written last.
    pub fn overlay(&mut self, shared: &VariableScope) {
        for (key, value) in shared.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }
}

impl From<Map<String, Value>> for VariableScope {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

// ---------------------------------------------------------------------------
// ProjectIdentity
// ---------------------------------------------------------------------------

/// Project used when the workspace name does not follow the origin convention.
pub const DEFAULT_PROJECT: &str = "sampleProject";
/// Application used when the workspace name does not follow the origin convention.
pub const DEFAULT_APPLICATION: &str = "sampleApplication";
const ORIGIN_SUFFIX: &str = "-origin";

/// Project / application pair derived from the workspace directory name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectIdentity {
    pub project: String,
    pub application: String,
}

impl Default for ProjectIdentity {
    fn default() -> Self {
        Self {
            project: DEFAULT_PROJECT.to_string(),
            application: DEFAULT_APPLICATION.to_string(),
        }
    }
}

impl ProjectIdentity {
    /// Parse `<project>-<application>-origin`.
    ///
    /// The project ends at the first hyphen and the application runs up to the
    /// last hyphen, so `acme-billing-api-origin` yields `acme` / `billing-api`.
    /// Anything else (including empty segments) yields the defaults.
    pub fn from_leaf(leaf: &str) -> Self {
        if !leaf.ends_with(ORIGIN_SUFFIX) {
            return Self::default();
        }
        let (Some(first), Some(last)) = (leaf.find('-'), leaf.rfind('-')) else {
            return Self::default();
        };
        if first == last {
            return Self::default();
        }
        let project = &leaf[..first];
        let application = &leaf[first + 1..last];
        if project.is_empty() || application.is_empty() {
            return Self::default();
        }
        Self {
            project: project.to_string(),
            application: application.to_string(),
        }
    }

    /// Identity for the workspace as the caller named it.
    ///
    /// The path is made absolute and `.`/`..` are resolved lexically, so `.`
    /// names the current directory. Symlinks are not followed: a link named
    /// `acme-billing-origin` gives `acme`/`billing` whatever it points to.
    pub fn from_workspace(workspace: &Path) -> Self {
        lexical_absolute(workspace)
            .file_name()
            .and_then(|name| name.to_str())
            .map(Self::from_leaf)
            .unwrap_or_default()
    }
}

fn lexical_absolute(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

// ---------------------------------------------------------------------------
// EnvironmentSet
// ---------------------------------------------------------------------------

/// Result of loading an environment directory.
///
/// `scopes` already contain the merged shared keys; `shared` is kept for
/// reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvironmentSet {
    pub shared: VariableScope,
    pub scopes: BTreeMap<EnvName, VariableScope>,
}

impl EnvironmentSet {
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn get(&self, env: &EnvName) -> Option<&VariableScope> {
        self.scopes.get(env)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EnvName, &VariableScope)> {
        self.scopes.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
