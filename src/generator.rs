//! Report Generators
//!
//! A generator holds the resolved settings for one request and runs the
//! pipeline in [`pipeline`]: template resolution, data binding, parameter
//! substitution, rendering, delivery. Strategies are picked by id through
//! [`GeneratorRegistry`].

pub mod basic;
pub mod embedded;
pub mod pipeline;
pub mod strategy;

use crate::connection::ConnectionInfo;
use crate::engine::OutputFormat;
use crate::error::ReportError;
use crate::params::ParameterSet;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Span};

pub use basic::BasicReportGenerator;
pub use embedded::EmbeddedReportGenerator;
pub use strategy::{GeneratorConstructor, GeneratorRegistry};

/// Everything a generator needs for one request.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    pub template_path: PathBuf,
    pub query_path: Option<PathBuf>,
    /// `None` renders with the template's embedded data source
    pub connection: Option<ConnectionInfo>,
    pub parameters: ParameterSet,
    /// Emit `[DEBUG]` events for each pipeline step
    pub debug: bool,
    /// Span the generator logs into
    pub span: Span,
}

impl GeneratorSettings {
    pub fn new(template_path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            query_path: None,
            connection: None,
            parameters: ParameterSet::new(),
            debug: false,
            span: Span::none(),
        }
    }

    pub fn with_query(mut self, query_path: impl Into<PathBuf>) -> Self {
        self.query_path = Some(query_path.into());
        self
    }

    pub fn with_connection(mut self, connection: ConnectionInfo) -> Self {
        self.connection = Some(connection);
        self
    }

    pub fn with_parameters(mut self, parameters: ParameterSet) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Log a `[DEBUG]` event when the debug flag is set.
    pub(crate) fn debug_event(&self, step: &str, detail: &dyn fmt::Display) {
        if self.debug {
            info!("[DEBUG] {}: {}", step, detail);
        }
    }
}

/// Produces one report in a requested format.
pub trait ReportGenerator: Send {
    fn settings(&self) -> &GeneratorSettings;

    /// Run the pipeline and write the report to `stream`.
    ///
    /// The stream is flushed but not closed.
    fn generate(
        &self,
        format: OutputFormat,
        stream: Option<&mut dyn Write>,
    ) -> Result<(), ReportError>;

    /// Run the pipeline into a newly created file.
    ///
    /// The file is flushed and closed before this returns, on success and on error.
    fn generate_to_file(&self, format: OutputFormat, file: Option<&Path>) -> Result<(), ReportError> {
        let path = file.ok_or_else(|| {
            ReportError::IllegalArgument("no destination file given".to_string())
        })?;
        let handle = File::create(path).map_err(|e| {
            ReportError::InvalidOutput(format!("cannot open {}: {}", path.display(), e))
        })?;
        let mut writer = BufWriter::new(handle);
        self.generate(format, Some(&mut writer as &mut dyn Write))?;
        writer.flush().map_err(|e| {
            ReportError::InvalidOutput(format!("cannot write {}: {}", path.display(), e))
        })
    }
}
