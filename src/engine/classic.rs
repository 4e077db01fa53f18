//! The production render engine.

use crate::engine::excel::ExcelOutputProcessor;
use crate::engine::html::HtmlOutputProcessor;
use crate::engine::pdf::PdfOutputProcessor;
use crate::engine::resource::{ResourceManager, UrlRewriter};
use crate::engine::template::{ReportConfiguration, Template};
use crate::engine::{OutputProcessor, RenderEngine};
use crate::error::EngineError;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Renders TOML templates to PDF, spreadsheet and HTML output.
#[derive(Debug, Default)]
pub struct ClassicEngine {
    booted: OnceLock<()>,
}

impl ClassicEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_booted(&self) -> bool {
        self.booted.get().is_some()
    }

    fn ensure_booted(&self) -> Result<(), EngineError> {
        if self.is_booted() {
            Ok(())
        } else {
            Err(EngineError::NotBooted)
        }
    }
}

impl RenderEngine for ClassicEngine {
    fn name(&self) -> &str {
        "classic"
    }

    fn boot(&self) -> Result<(), EngineError> {
        self.booted.get_or_init(|| {
            info!(engine = "classic", "Render engine booted");
        });
        Ok(())
    }

    fn load_template(&self, path: &Path) -> Result<Template, EngineError> {
        self.ensure_booted()?;
        let template = Template::load(path)?;
        debug!(template = %path.display(), columns = template.columns().len(), "Template loaded");
        Ok(template)
    }

    fn pdf_processor<'a>(
        &self,
        configuration: &ReportConfiguration,
        sink: &'a mut dyn Write,
        _resources: &ResourceManager,
    ) -> Result<Box<dyn OutputProcessor + 'a>, EngineError> {
        self.ensure_booted()?;
        Ok(Box::new(PdfOutputProcessor::new(configuration.clone(), sink)))
    }

    fn excel_processor<'a>(
        &self,
        _configuration: &ReportConfiguration,
        sink: &'a mut dyn Write,
        _resources: &ResourceManager,
    ) -> Result<Box<dyn OutputProcessor + 'a>, EngineError> {
        self.ensure_booted()?;
        Ok(Box::new(ExcelOutputProcessor::new(sink)))
    }

    fn html_processor<'a>(
        &self,
        configuration: &ReportConfiguration,
        sink: &'a mut dyn Write,
        resources: &ResourceManager,
        url_rewriter: Box<dyn UrlRewriter>,
    ) -> Result<Box<dyn OutputProcessor + 'a>, EngineError> {
        self.ensure_booted()?;
        Ok(Box::new(HtmlOutputProcessor::new(
            configuration.clone(),
            sink,
            resources.clone(),
            url_rewriter,
        )))
    }
}
