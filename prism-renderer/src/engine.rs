//! Tera rendering engine — [`RenderEngine`] contract and [`TemplateEngine`].
//!
//! # Contract
//!
//! | Step      | Failure scope                        |
//! |-----------|--------------------------------------|
//! | `compile` | one template, every environment      |
//! | `render`  | one template, one environment        |
//!
//! Variables that a template reads but the scope does not define are render
//! errors, never empty strings or false conditions. Tera only enforces this
//! for printed values, so conditions are rewritten after parsing to look
//! variables up strictly.

use tera::Tera;

use prism_core::VariableScope;

use crate::config::EngineConfig;
use crate::context::to_tera_context;
use crate::error::RenderError;
use crate::strict;

// ---------------------------------------------------------------------------
// RenderEngine
// ---------------------------------------------------------------------------

/// Narrow interface the batch pipeline uses to talk to a template engine.
pub trait RenderEngine {
    /// Engine-specific compiled form of one template.
    type Compiled;

    /// Parse `source` under the identity `id`.
    fn compile(&self, id: &str, source: &str) -> Result<Self::Compiled, RenderError>;

    /// Evaluate a compiled template against `scope`.
    fn render(&self, template: &Self::Compiled, scope: &VariableScope)
        -> Result<String, RenderError>;
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// A template compiled by [`TemplateEngine`].
///
/// Each template owns its own [`Tera`] instance, so a template that fails to
/// compile never affects another.
pub struct CompiledTemplate {
    id: String,
    tera: Tera,
}

impl std::fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledTemplate").field("id", &self.id).finish()
    }
}

/// Tera-backed [`RenderEngine`].
///
/// Create once per run with an [`EngineConfig`] and reuse for every template.
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine {
    config: EngineConfig,
}

impl TemplateEngine {
    pub fn new(config: EngineConfig) -> Self {
        TemplateEngine { config }
    }
}

impl RenderEngine for TemplateEngine {
    type Compiled = CompiledTemplate;

    fn compile(&self, id: &str, source: &str) -> Result<CompiledTemplate, RenderError> {
        let normalized;
        let source = if self.config.normalize_line_endings {
            normalized = source.replace("\r\n", "\n");
            normalized.as_str()
        } else {
            source
        };

        let mut tera = Tera::default();
        tera.autoescape_on(self.config.autoescape_suffixes.clone());
        tera.add_raw_template(id, source)
            .map_err(|e| RenderError::Compile {
                template: id.to_string(),
                source: e,
            })?;
        strict::install(&mut tera);

        tracing::debug!("compiled: {id}");
        Ok(CompiledTemplate {
            id: id.to_string(),
            tera,
        })
    }

    fn render(
        &self,
        template: &CompiledTemplate,
        scope: &VariableScope,
    ) -> Result<String, RenderError> {
        let ctx = to_tera_context(scope);
        template
            .tera
            .render(&template.id, &ctx)
            .map_err(|e| RenderError::Render {
                template: template.id.clone(),
                source: e,
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
