//! Engine configuration.

/// Immutable settings handed to [`TemplateEngine::new`](crate::TemplateEngine::new).
///
/// Templates are read as UTF-8 by the caller; the engine only sees `&str`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Template name suffixes for which HTML autoescaping is enabled.
    /// Empty by default: rendered artifacts are configuration files.
    pub autoescape_suffixes: Vec<&'static str>,
    /// Rewrite `\r\n` to `\n` in template sources before compiling.
    pub normalize_line_endings: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            autoescape_suffixes: Vec::new(),
            normalize_line_endings: true,
        }
    }
}
