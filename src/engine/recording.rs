//! A render engine that records what it is handed instead of rendering.

use crate::engine::resource::{ResourceManager, UrlRewriter};
use crate::engine::template::{ReportConfiguration, Template};
use crate::engine::{OutputFormat, OutputProcessor, RenderEngine};
use crate::error::EngineError;
use crate::params::ParameterTable;
use parking_lot::Mutex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What one `process` call saw.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRecord {
    pub format: OutputFormat,
    pub template: PathBuf,
    pub query_name: String,
    /// Text of the named query on the attached data factory
    pub query_text: Option<String>,
    pub parameters: ParameterTable,
}

#[derive(Debug, Default)]
struct RecordingState {
    boots: usize,
    templates_loaded: Vec<PathBuf>,
    processors_opened: usize,
    processors_closed: usize,
    renders: Vec<RenderRecord>,
}

/// Test double for [`RenderEngine`].
#[derive(Debug, Clone, Default)]
pub struct RecordingEngine {
    state: Arc<Mutex<RecordingState>>,
    failure: Option<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose processors fail with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            state: Arc::default(),
            failure: Some(message.into()),
        }
    }

    pub fn boots(&self) -> usize {
        self.state.lock().boots
    }

    pub fn templates_loaded(&self) -> Vec<PathBuf> {
        self.state.lock().templates_loaded.clone()
    }

    pub fn processors_opened(&self) -> usize {
        self.state.lock().processors_opened
    }

    pub fn processors_closed(&self) -> usize {
        self.state.lock().processors_closed
    }

    pub fn renders(&self) -> Vec<RenderRecord> {
        self.state.lock().renders.clone()
    }

    pub fn last_render(&self) -> Option<RenderRecord> {
        self.state.lock().renders.last().cloned()
    }

    fn open<'a>(
        &self,
        format: OutputFormat,
        sink: &'a mut dyn Write,
    ) -> Result<Box<dyn OutputProcessor + 'a>, EngineError> {
        self.state.lock().processors_opened += 1;
        Ok(Box::new(RecordingProcessor {
            format,
            sink,
            state: Arc::clone(&self.state),
            failure: self.failure.clone(),
        }))
    }
}

impl RenderEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn boot(&self) -> Result<(), EngineError> {
        self.state.lock().boots += 1;
        Ok(())
    }

    fn load_template(&self, path: &Path) -> Result<Template, EngineError> {
        let template = Template::load(path)?;
        self.state.lock().templates_loaded.push(path.to_path_buf());
        Ok(template)
    }

    fn pdf_processor<'a>(
        &self,
        _configuration: &ReportConfiguration,
        sink: &'a mut dyn Write,
        _resources: &ResourceManager,
    ) -> Result<Box<dyn OutputProcessor + 'a>, EngineError> {
        self.open(OutputFormat::Pdf, sink)
    }

    fn excel_processor<'a>(
        &self,
        _configuration: &ReportConfiguration,
        sink: &'a mut dyn Write,
        _resources: &ResourceManager,
    ) -> Result<Box<dyn OutputProcessor + 'a>, EngineError> {
        self.open(OutputFormat::Excel, sink)
    }

    fn html_processor<'a>(
        &self,
        _configuration: &ReportConfiguration,
        sink: &'a mut dyn Write,
        _resources: &ResourceManager,
        _url_rewriter: Box<dyn UrlRewriter>,
    ) -> Result<Box<dyn OutputProcessor + 'a>, EngineError> {
        self.open(OutputFormat::Html, sink)
    }
}

struct RecordingProcessor<'a> {
    format: OutputFormat,
    sink: &'a mut dyn Write,
    state: Arc<Mutex<RecordingState>>,
    failure: Option<String>,
}

impl OutputProcessor for RecordingProcessor<'_> {
    fn process(&mut self, template: &Template) -> Result<(), EngineError> {
        if let Some(message) = &self.failure {
            return Err(EngineError::Render(message.clone()));
        }
        let query_text = template
            .data_factory()
            .and_then(|factory| factory.query_text(template.query()))
            .map(str::to_string);
        self.state.lock().renders.push(RenderRecord {
            format: self.format,
            template: template.source().to_path_buf(),
            query_name: template.query().to_string(),
            query_text,
            parameters: template.parameter_values().clone(),
        });
        write!(self.sink, "recorded {} {}", self.format, template.source().display())?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.state.lock().processors_closed += 1;
        self.sink.flush()?;
        Ok(())
    }
}
