//! Error types for envforge operations.
//!
//! Defines error types for the major subsystems:
//! - Configuration loading and validation
//! - Container engine operations (build, push, pull, remove, inspect)
//! - Pipeline stage execution and compensating undo actions

use thiserror::Error;

/// A single validation failure for one configuration field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Dotted path of the offending field (e.g. "dependencies.lang").
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Errors that can occur while loading the assignment environment configuration.
///
/// All of these are fatal and surface before the pipeline starts, so they
/// never trigger rollback.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid configuration: {}", format_field_errors(.0))]
    Invalid(Vec<FieldError>),

    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("language '{name}' version '{version}' is not supported: no installation script at '{script}'")]
    UnsupportedLanguage {
        name: String,
        version: String,
        script: String,
    },
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur during container engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("container engine not available: {0}")]
    DaemonUnavailable(String),

    #[error("image '{tag}' not found")]
    ImageNotFound { tag: String },

    #[error("image lookup failed: {0}")]
    SearchFailed(String),

    #[error("image build failed: {0}")]
    BuildFailed(String),

    #[error("image push failed: {0}")]
    PushFailed(String),

    #[error("image pull failed: {0}")]
    PullFailed(String),

    #[error("image remove failed: {0}")]
    RemoveFailed(String),
}

/// Errors returned by a single pipeline stage's execute or undo action.
#[derive(Debug, Error)]
pub enum StageError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("dockerfile I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by the command pipeline.
///
/// A forward failure is wrapped with the name of the stage that produced it.
/// Undo failures are logged on the forward-failure path and only returned
/// when rollback is invoked directly.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: StageError,
    },

    #[error("undo of {stage} stage failed: {source}")]
    Undo {
        stage: &'static str,
        #[source]
        source: StageError,
    },
}
