//! # prism-renderer
//!
//! Tera-based render engine adapter: compiles workspace templates and renders
//! them against per-environment [`VariableScope`](prism_core::VariableScope)s.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use prism_core::VariableScope;
//! use prism_renderer::{EngineConfig, RenderEngine, TemplateEngine};
//!
//! fn render_one(source: &str, scope: &VariableScope) {
//!     let engine = TemplateEngine::new(EngineConfig::default());
//!     match engine.compile("app.template.json", source) {
//!         Ok(tpl) => match engine.render(&tpl, scope) {
//!             Ok(text) => println!("{text}"),
//!             Err(e) => eprintln!("{}", e.diagnostic()),
//!         },
//!         Err(e) => eprintln!("{}", e.diagnostic()),
//!     }
//! }
//! ```

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
mod strict;

pub use config::EngineConfig;
pub use engine::{CompiledTemplate, RenderEngine, TemplateEngine};
pub use error::RenderError;
