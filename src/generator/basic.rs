//! The default generator strategy: external connection and query file.

use super::{pipeline, GeneratorSettings, ReportGenerator};
use crate::engine::{OutputFormat, RenderEngine};
use crate::error::ReportError;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

/// Runs the full pipeline. With connection info the report reads from the
/// configured database through the substituted query file; without it the
/// template's own data source is used.
pub struct BasicReportGenerator {
    engine: Arc<dyn RenderEngine>,
    settings: GeneratorSettings,
}

impl BasicReportGenerator {
    pub fn new(engine: Arc<dyn RenderEngine>, settings: GeneratorSettings) -> Self {
        Self { engine, settings }
    }

    /// Constructor registered as the `basic` strategy.
    pub fn boxed(engine: Arc<dyn RenderEngine>, settings: GeneratorSettings) -> Box<dyn ReportGenerator> {
        Box::new(Self::new(engine, settings))
    }
}

impl ReportGenerator for BasicReportGenerator {
    fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    fn generate(
        &self,
        format: OutputFormat,
        stream: Option<&mut dyn Write>,
    ) -> Result<(), ReportError> {
        let sink = stream
            .ok_or_else(|| ReportError::IllegalArgument("no output stream given".to_string()))?;
        let settings = &self.settings;
        let _entered = settings.span.enter();

        settings.debug_event("template", &settings.template_path.display());
        let mut template = pipeline::resolve_template(self.engine.as_ref(), &settings.template_path)?;
        let data_source = pipeline::resolve_data_source(settings)?;
        pipeline::bind_parameters(&mut template, settings.parameters.report_parameters());
        pipeline::attach_data_source(&mut template, data_source);

        settings.debug_event("output", &format);
        pipeline::render(self.engine.as_ref(), &template, format, sink)?;
        pipeline::flush(sink)?;

        info!(
            template = %settings.template_path.display(),
            format = %format,
            "Report generated"
        );
        Ok(())
    }
}
