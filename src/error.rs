//! Error types for report generation.
//!
//! `ReportError` is what callers of the pipeline and the service see.
//! `EngineError` is raised behind the render engine boundary and mapped into
//! `ReportError` by the generator.

use std::path::PathBuf;
use thiserror::Error;

/// Render engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Render engine has not been booted")]
    NotBooted,

    #[error("Cannot read template {path:?}: {source}")]
    TemplateIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot parse template {path:?}: {reason}")]
    TemplateParse { path: PathBuf, reason: String },

    #[error("Unsupported connection driver: {0}")]
    UnsupportedDriver(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query '{name}' failed: {reason}")]
    Query { name: String, reason: String },

    #[error("Column field '{0}' is not part of the result set")]
    UnknownField(String),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Output I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Report pipeline and service errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Report not found: {path:?}: {reason}")]
    ReportNotFound { path: PathBuf, reason: String },

    #[error("Query not found: {path:?}: {source}")]
    QueryNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Report processing failed: {0}")]
    ReportProcessing(#[source] EngineError),

    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),
}

impl ReportError {
    /// Map an engine failure raised while rendering.
    ///
    /// Failures writing the destination are output errors; everything else the
    /// engine reports is a processing error.
    pub fn from_render(err: EngineError) -> Self {
        match err {
            EngineError::Io(e) => ReportError::InvalidOutput(format!("write failed: {}", e)),
            other => ReportError::ReportProcessing(other),
        }
    }

    /// Map an engine failure raised while loading a template.
    pub fn from_template(path: impl Into<PathBuf>, err: EngineError) -> Self {
        ReportError::ReportNotFound {
            path: path.into(),
            reason: err.to_string(),
        }
    }
}

impl From<config::ConfigError> for ReportError {
    fn from(err: config::ConfigError) -> Self {
        ReportError::ConfigError(err.to_string())
    }
}
