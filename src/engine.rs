//! Render Engine Boundary
//!
//! The pipeline talks to the render engine through [`RenderEngine`]: template
//! loading, a parameter table and replaceable data factory on the loaded
//! [`Template`], and one output processor per format. Processors are
//! acquired through a [`ProcessorGuard`] so they are closed exactly once,
//! whatever happens while processing.
//!
//! [`classic::ClassicEngine`] is the production engine. With the
//! `test-support` feature, `recording::RecordingEngine` captures what the
//! pipeline hands over.

pub mod classic;
pub mod data;
pub mod excel;
pub mod html;
pub mod pdf;
#[cfg(any(test, feature = "test-support"))]
pub mod recording;
pub mod resource;
pub mod template;

use crate::error::EngineError;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

pub use classic::ClassicEngine;
pub use data::{CellValue, DataFactory, ResultTable, TableDataFactory};
#[cfg(any(test, feature = "test-support"))]
pub use recording::RecordingEngine;
pub use resource::{FileSystemUrlRewriter, ResourceManager, UrlRewriter};
pub use template::{Column, PageOrientation, PageSize, ReportConfiguration, Template};

/// Output format of a generated report
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Pdf,
    #[default]
    Html,
    #[value(alias = "xls")]
    #[serde(alias = "xls")]
    Excel,
}

impl OutputFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Html => "html",
            OutputFormat::Excel => "xls",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Html => "html",
            OutputFormat::Excel => "excel",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "html" => Ok(OutputFormat::Html),
            "excel" | "xls" => Ok(OutputFormat::Excel),
            other => Err(format!(
                "unknown output format '{}' (expected pdf, html or excel)",
                other
            )),
        }
    }
}

/// One output strategy writing a report into a sink.
pub trait OutputProcessor {
    /// Lay out and encode `template` into the sink.
    fn process(&mut self, template: &Template) -> Result<(), EngineError>;

    /// Release the processor. Flushes the sink; does not close it.
    fn close(&mut self) -> Result<(), EngineError>;
}

/// Owns a processor and closes it exactly once, on success, error, or unwind.
pub struct ProcessorGuard<'a> {
    processor: Box<dyn OutputProcessor + 'a>,
    closed: bool,
}

impl<'a> ProcessorGuard<'a> {
    pub fn new(processor: Box<dyn OutputProcessor + 'a>) -> Self {
        Self {
            processor,
            closed: false,
        }
    }

    pub fn process(&mut self, template: &Template) -> Result<(), EngineError> {
        self.processor.process(template)
    }

    /// Close now and report the result.
    pub fn close(mut self) -> Result<(), EngineError> {
        self.closed = true;
        self.processor.close()
    }
}

impl Drop for ProcessorGuard<'_> {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            if let Err(e) = self.processor.close() {
                warn!(error = %e, "Failed to close output processor");
            }
        }
    }
}

/// The render engine capability.
pub trait RenderEngine: Send + Sync {
    fn name(&self) -> &str;

    /// Start the engine. Idempotent.
    fn boot(&self) -> Result<(), EngineError>;

    /// Load and parse the template at `path`.
    fn load_template(&self, path: &Path) -> Result<Template, EngineError>;

    /// Paginated fixed-layout (PDF) processor.
    fn pdf_processor<'a>(
        &self,
        configuration: &ReportConfiguration,
        sink: &'a mut dyn Write,
        resources: &ResourceManager,
    ) -> Result<Box<dyn OutputProcessor + 'a>, EngineError>;

    /// Flow table (spreadsheet) processor.
    fn excel_processor<'a>(
        &self,
        configuration: &ReportConfiguration,
        sink: &'a mut dyn Write,
        resources: &ResourceManager,
    ) -> Result<Box<dyn OutputProcessor + 'a>, EngineError>;

    /// Streaming table (single HTML document) processor.
    fn html_processor<'a>(
        &self,
        configuration: &ReportConfiguration,
        sink: &'a mut dyn Write,
        resources: &ResourceManager,
        url_rewriter: Box<dyn UrlRewriter>,
    ) -> Result<Box<dyn OutputProcessor + 'a>, EngineError>;
}
