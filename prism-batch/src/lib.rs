//! # prism-batch
//!
//! Template discovery, output path mapping, atomic artifact writes and the
//! batch orchestrator tying them together.
//!
//! Call [`run`] to render every template for every environment of a
//! workspace, or [`diff_workspace`] to preview the changes without writing.

pub mod diff;
pub mod discover;
pub mod error;
pub mod paths;
pub mod pipeline;
pub mod writer;

pub use diff::{diff_workspace, DiffReport, FileDiff};
pub use discover::{discover, TemplateMatcher, TemplateUnit};
pub use error::BatchError;
pub use paths::map_output_path;
pub use pipeline::{run, Artifact, BatchReport, Failure, FailureStage, RunOptions};
pub use writer::{write_artifact, WriteResult};
