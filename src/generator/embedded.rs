//! Generator strategy that always uses the template's own data source.

use super::{pipeline, GeneratorSettings, ReportGenerator};
use crate::engine::{OutputFormat, RenderEngine};
use crate::error::ReportError;
use std::io::Write;
use std::sync::Arc;
use tracing::{debug, info};

/// Renders with the data source declared in the template. Connection info and
/// the query file are ignored; report parameters are still bound.
pub struct EmbeddedReportGenerator {
    engine: Arc<dyn RenderEngine>,
    settings: GeneratorSettings,
}

impl EmbeddedReportGenerator {
    pub fn new(engine: Arc<dyn RenderEngine>, settings: GeneratorSettings) -> Self {
        Self { engine, settings }
    }

    /// Constructor registered as the `embedded` strategy.
    pub fn boxed(engine: Arc<dyn RenderEngine>, settings: GeneratorSettings) -> Box<dyn ReportGenerator> {
        Box::new(Self::new(engine, settings))
    }
}

impl ReportGenerator for EmbeddedReportGenerator {
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

        let (report_parameters, query_parameters) = settings.parameters.partition();
        for param in &query_parameters {
            debug!(parameter = %param.key, "Query parameter ignored by embedded data source");
        }
        pipeline::bind_parameters(&mut template, report_parameters);

        settings.debug_event("output", &format);
        pipeline::render(self.engine.as_ref(), &template, format, sink)?;
        pipeline::flush(sink)?;

        info!(
            template = %settings.template_path.display(),
            format = %format,
            "Report generated from embedded data source"
        );
        Ok(())
    }
}
