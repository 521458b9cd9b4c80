//! Batch pipeline shared by `render` and `diff`.
//!
//! ```text
//! LOAD_ENVIRONMENTS → DISCOVER_TEMPLATES → (COMPILE → RENDER_ALL_ENVS)* → DONE
//! ```
//!
//! Failure scopes:
//!
//! | Failure                         | Effect                               |
//! |---------------------------------|--------------------------------------|
//! | workspace missing               | run aborts                           |
//! | malformed environment file      | run aborts                           |
//! | template discovery I/O          | run aborts                           |
//! | compile                         | template skipped, run continues      |
//! | render / write                  | pair recorded, run continues         |

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use prism_core::{environment, EnvName, EnvironmentSet, VariableScope};
use prism_renderer::{EngineConfig, RenderEngine, TemplateEngine};

use crate::discover::{self, TemplateMatcher, TemplateUnit};
use crate::error::BatchError;
use crate::paths::map_output_path;
use crate::writer::{self, WriteResult};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Per-run settings.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Report what would be written without touching the filesystem.
    pub dry_run: bool,
    pub engine: EngineConfig,
    pub matcher: TemplateMatcher,
}

// ---------------------------------------------------------------------------
// Failures and report
// ---------------------------------------------------------------------------

/// Pipeline step an isolated failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Compile,
    Render,
    Write,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Compile => write!(f, "compile"),
            FailureStage::Render => write!(f, "render"),
            FailureStage::Write => write!(f, "write"),
        }
    }
}

/// A failure isolated to one template (compile) or one pair (render, write).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub stage: FailureStage,
    pub template: PathBuf,
    /// `None` for compile failures, which affect every environment.
    pub environment: Option<EnvName>,
    pub message: String,
}

impl fmt::Display for Failure {
    /// Diagnostic block written to stderr:
    ///
    /// ```text
    /// <template env="dev" name="/ws/app.template.json">
    /// message
    /// </template>
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env = self.environment.as_ref().map_or("*", EnvName::as_str);
        writeln!(
            f,
            "<template env=\"{env}\" name=\"{}\">",
            self.template.display()
        )?;
        writeln!(f, "{}", self.message)?;
        write!(f, "</template>")
    }
}

/// Aggregate outcome of one run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Canonical workspace root the run used.
    pub workspace: PathBuf,
    pub environments: usize,
    /// Templates discovered, whether or not they compiled.
    pub templates_processed: usize,
    pub templates_failed: usize,
    pub renders_succeeded: usize,
    pub renders_failed: usize,
    pub writes: Vec<WriteResult>,
    pub failures: Vec<Failure>,
}

impl BatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failed_writes(&self) -> usize {
        self.failures
            .iter()
            .filter(|f| f.stage == FailureStage::Write)
            .count()
    }
}

/// One rendered (template, environment) pair, handed to the sink.
#[derive(Debug)]
pub struct Artifact<'a> {
    /// Canonical workspace root.
    pub workspace: &'a Path,
    pub template: &'a Path,
    pub environment: &'a EnvName,
    /// Destination from [`map_output_path`].
    pub path: PathBuf,
    pub content: String,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Canonicalize `workspace` and load its environment scopes.
///
/// The canonical root drives discovery and output paths; the project
/// identity comes from `workspace` as the caller named it. Environment
/// loading finishes (shared merge included) before any template is touched.
pub fn load_environments(workspace: &Path) -> Result<(PathBuf, EnvironmentSet), BatchError> {
    let root = std::fs::canonicalize(workspace)
        .ok()
        .filter(|p| p.is_dir())
        .ok_or_else(|| BatchError::WorkspaceNotFound {
            path: workspace.to_path_buf(),
        })?;
    let environments = environment::load_workspace_scopes(workspace)?;
    if environments.is_empty() {
        tracing::warn!("no environments found under {}; nothing will be rendered", root.display());
    }
    Ok((root, environments))
}

/// Render every template for every environment and write the artifacts.
///
/// This is the canonical entrypoint for `prism render`.
pub fn run(workspace: &Path, options: &RunOptions) -> Result<BatchReport, BatchError> {
    render_each(workspace, options, |artifact| {
        writer::write_artifact(&artifact.path, &artifact.content, options.dry_run)
    })
}

/// Run the pipeline with the Tera engine, passing each rendered artifact to
/// `sink`.
pub fn render_each<F>(workspace: &Path, options: &RunOptions, sink: F) -> Result<BatchReport, BatchError>
where
    F: FnMut(&Artifact<'_>) -> Result<WriteResult, BatchError>,
{
    let engine = TemplateEngine::new(options.engine.clone());
    render_each_with(&engine, workspace, &options.matcher, sink)
}

/// Run the pipeline with an arbitrary [`RenderEngine`].
///
/// Errors returned by `sink` are recorded as write failures for that pair.
pub fn render_each_with<E, F>(
    engine: &E,
    workspace: &Path,
    matcher: &TemplateMatcher,
    mut sink: F,
) -> Result<BatchReport, BatchError>
where
    E: RenderEngine,
    F: FnMut(&Artifact<'_>) -> Result<WriteResult, BatchError>,
{
    let (root, environments) = load_environments(workspace)?;
    let mut report = BatchReport {
        workspace: root.clone(),
        environments: environments.len(),
        ..BatchReport::default()
    };

    for unit in discover::discover(&root, matcher) {
        let unit = unit?;
        report.templates_processed += 1;
        process_template(engine, &root, &environments, &unit, &mut sink, &mut report);
    }

    tracing::info!(
        "batch done: {} template(s), {} rendered, {} failed",
        report.templates_processed,
        report.renders_succeeded,
        report.renders_failed
    );
    Ok(report)
}

// ---------------------------------------------------------------------------
// Per-template processing
// ---------------------------------------------------------------------------

fn process_template<E, F>(
    engine: &E,
    root: &Path,
    environments: &EnvironmentSet,
    unit: &TemplateUnit,
    sink: &mut F,
    report: &mut BatchReport,
) where
    E: RenderEngine,
    F: FnMut(&Artifact<'_>) -> Result<WriteResult, BatchError>,
{
    let compiled = match engine.compile(&unit.id(), &unit.source) {
        Ok(compiled) => compiled,
        Err(e) => {
            tracing::error!("compile failed: {}: {}", unit.path.display(), e.diagnostic());
            report.templates_failed += 1;
            report.failures.push(Failure {
                stage: FailureStage::Compile,
                template: unit.path.clone(),
                environment: None,
                message: e.diagnostic(),
            });
            return;
        }
    };

    for (env, scope) in environments.iter() {
        match render_pair(engine, &compiled, root, unit, env, scope, sink) {
            Ok(result) => {
                report.renders_succeeded += 1;
                report.writes.push(result);
            }
            Err(failure) => {
                tracing::error!(
                    "{} failed: env={} template={}: {}",
                    failure.stage,
                    env,
                    unit.path.display(),
                    failure.message
                );
                if failure.stage == FailureStage::Render {
                    report.renders_failed += 1;
                } else {
                    report.renders_succeeded += 1;
                }
                report.failures.push(failure);
            }
        }
    }
}

fn render_pair<E, F>(
    engine: &E,
    compiled: &E::Compiled,
    root: &Path,
    unit: &TemplateUnit,
    env: &EnvName,
    scope: &VariableScope,
    sink: &mut F,
) -> Result<WriteResult, Failure>
where
    E: RenderEngine,
    F: FnMut(&Artifact<'_>) -> Result<WriteResult, BatchError>,
{
    let failure = |stage, message: String| Failure {
        stage,
        template: unit.path.clone(),
        environment: Some(env.clone()),
        message,
    };

    let content = engine
        .render(compiled, scope)
        .map_err(|e| failure(FailureStage::Render, e.diagnostic()))?;
    let path = map_output_path(root, &unit.path, env)
        .map_err(|e| failure(FailureStage::Write, e.to_string()))?;

    let artifact = Artifact {
        workspace: root,
        template: &unit.path,
        environment: env,
        path,
        content,
    };
    sink(&artifact).map_err(|e| failure(FailureStage::Write, e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::fs;

    use prism_renderer::RenderError;
    use tempfile::TempDir;

    use super::*;

    fn touch(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    /// Echoes the template source, failing for one environment name.
    struct FailFor(&'static str);

    impl RenderEngine for FailFor {
        type Compiled = String;

        fn compile(&self, _id: &str, source: &str) -> Result<String, RenderError> {
            Ok(source.to_string())
        }

        fn render(&self, tpl: &String, scope: &VariableScope) -> Result<String, RenderError> {
            if scope.get("env").and_then(|v| v.as_str()) == Some(self.0) {
                return Err(RenderError::Render {
                    template: "fake".to_string(),
                    source: tera::Error::msg("Variable `nope` not found in context"),
                });
            }
            Ok(tpl.clone())
        }
    }

    #[test]
    fn failure_block_format() {
        let failure = Failure {
            stage: FailureStage::Render,
            template: PathBuf::from("/ws/a.template.json"),
            environment: Some(EnvName::from("prod")),
            message: "Variable `x` not found".to_string(),
        };
        assert_eq!(
            failure.to_string(),
            "<template env=\"prod\" name=\"/ws/a.template.json\">\nVariable `x` not found\n</template>"
        );
    }

    #[test]
    fn compile_failure_block_uses_wildcard_env() {
        let failure = Failure {
            stage: FailureStage::Compile,
            template: PathBuf::from("/ws/a.template.json"),
            environment: None,
            message: "bad".to_string(),
        };
        assert!(failure.to_string().starts_with("<template env=\"*\""));
    }

    #[test]
    fn missing_workspace_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let err = run(&tmp.path().join("missing"), &RunOptions::default()).unwrap_err();
        assert!(matches!(err, BatchError::WorkspaceNotFound { .. }));
    }

    #[test]
    fn sink_errors_become_write_failures() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "environment/dev.json", "{}");
        touch(tmp.path(), "a.template.json", "x");

        let report = render_each(tmp.path(), &RunOptions::default(), |artifact| {
            Err(BatchError::Io {
                path: artifact.path.clone(),
                source: std::io::Error::other("disk full"),
            })
        })
        .unwrap();

        assert_eq!(report.renders_succeeded, 1);
        assert_eq!(report.renders_failed, 0);
        assert_eq!(report.failed_writes(), 1);
        assert!(report.writes.is_empty());
        assert!(report.failures[0].message.contains("disk full"));
    }

    #[test]
    fn render_failure_in_one_env_leaves_others_intact() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "environment/dev.json", r#"{"env":"dev"}"#);
        touch(tmp.path(), "environment/prod.json", r#"{"env":"prod"}"#);
        touch(tmp.path(), "a.template.json", "a");
        touch(tmp.path(), "b.template.json", "b");

        let mut seen = Vec::new();
        let report = render_each_with(
            &FailFor("prod"),
            tmp.path(),
            &TemplateMatcher::default(),
            |artifact| {
                seen.push((artifact.environment.to_string(), artifact.content.clone()));
                Ok(WriteResult::WouldWrite {
                    path: artifact.path.clone(),
                })
            },
        )
        .unwrap();

        assert_eq!(report.templates_processed, 2);
        assert_eq!(report.renders_succeeded, 2);
        assert_eq!(report.renders_failed, 2);
        assert_eq!(
            seen,
            vec![
                ("dev".to_string(), "a".to_string()),
                ("dev".to_string(), "b".to_string())
            ]
        );
        assert!(report
            .failures
            .iter()
            .all(|f| f.environment == Some(EnvName::from("prod"))));
    }
}
