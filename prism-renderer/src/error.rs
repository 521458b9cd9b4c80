//! Error types for prism-renderer.

use std::error::Error as StdError;

use thiserror::Error;

/// All errors that can arise from compiling or rendering a template.
///
/// `Compile` is scoped to one template; `Render` to one template and one
/// variable scope.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template source is not valid template syntax.
    #[error("failed to compile template '{template}'")]
    Compile {
        template: String,
        #[source]
        source: tera::Error,
    },

    /// Evaluation failed against a particular scope (undefined variable,
    /// filter error, type mismatch...).
    #[error("failed to render template '{template}'")]
    Render {
        template: String,
        #[source]
        source: tera::Error,
    },
}

impl RenderError {
    /// Template identity the error belongs to.
    pub fn template(&self) -> &str {
        match self {
            RenderError::Compile { template, .. } | RenderError::Render { template, .. } => {
                template
            }
        }
    }

    /// The engine's message, with every nested cause joined by `": "`.
    ///
    /// Tera keeps the useful part (e.g. which variable was missing) in the
    /// source chain rather than in the top-level message.
    pub fn diagnostic(&self) -> String {
        match self {
            RenderError::Compile { source, .. } | RenderError::Render { source, .. } => {
                error_chain(source)
            }
        }
    }
}

/// Render `err` and all of its sources as a single line.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        current = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("inner")]
    struct Inner;

    #[test]
    fn chain_joins_all_sources() {
        assert_eq!(error_chain(&Outer(Inner)), "outer: inner");
    }

    #[test]
    fn chain_of_leaf_is_its_message() {
        assert_eq!(error_chain(&Inner), "inner");
    }
}
