//! Prism core library — domain types, environment loading, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes, [`VariableScope`], [`ProjectIdentity`]
//! - [`error`] — [`EnvironmentError`]
//! - [`environment`] — load and merge per-environment variable scopes

pub mod environment;
pub mod error;
pub mod types;

pub use error::EnvironmentError;
pub use types::{EnvName, EnvironmentSet, ProjectIdentity, VariableScope};
