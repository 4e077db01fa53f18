//! Pipeline steps shared by the generator strategies.

use super::GeneratorSettings;
use crate::connection::{SqlDataSource, REPORT_QUERY};
use crate::engine::{
    FileSystemUrlRewriter, OutputFormat, ProcessorGuard, RenderEngine, Template,
};
use crate::error::ReportError;
use crate::params::ParameterTable;
use crate::query::load_and_substitute;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Load and parse the template at `path`.
pub fn resolve_template(engine: &dyn RenderEngine, path: &Path) -> Result<Template, ReportError> {
    if path.as_os_str().is_empty() {
        return Err(ReportError::ReportNotFound {
            path: path.to_path_buf(),
            reason: "malformed template path".to_string(),
        });
    }
    engine
        .load_template(path)
        .map_err(|e| ReportError::from_template(path, e))
}

/// Build the SQL data source for the configured connection, if any.
///
/// The descriptor carries one query named `ReportQuery`: the query file with
/// the `SQL_` parameters substituted.
pub fn resolve_data_source(
    settings: &GeneratorSettings,
) -> Result<Option<SqlDataSource>, ReportError> {
    let Some(connection) = &settings.connection else {
        return Ok(None);
    };
    let query_path = settings
        .query_path
        .as_deref()
        .ok_or_else(|| ReportError::QueryNotFound {
            path: PathBuf::new(),
            source: io::Error::new(io::ErrorKind::NotFound, "no query file configured"),
        })?;
    let sql = load_and_substitute(query_path, &settings.parameters.query_parameters())?;
    settings.debug_event("connection", &connection.summary());
    settings.debug_event("query", &sql);
    Ok(Some(SqlDataSource::single(connection.clone(), sql)))
}

/// Write each report parameter into the template's parameter table.
pub fn bind_parameters(template: &mut Template, report_parameters: ParameterTable) {
    for (key, value) in report_parameters {
        debug!(parameter = %key, "Binding report parameter");
        template.set_parameter(key, value);
    }
}

/// Replace the template's data factory with `data_source`.
pub fn attach_data_source(template: &mut Template, data_source: Option<SqlDataSource>) {
    if let Some(data_source) = data_source {
        template.set_query(REPORT_QUERY);
        template.set_data_factory(Box::new(data_source));
    }
}

/// Render `template` as `format` into `sink`. The processor is closed exactly once.
pub fn render(
    engine: &dyn RenderEngine,
    template: &Template,
    format: OutputFormat,
    sink: &mut dyn Write,
) -> Result<(), ReportError> {
    let configuration = template.configuration();
    let resources = template.resource_manager();
    let processor = match format {
        OutputFormat::Pdf => engine.pdf_processor(configuration, sink, resources),
        OutputFormat::Excel => engine.excel_processor(configuration, sink, resources),
        OutputFormat::Html => {
            let rewriter = FileSystemUrlRewriter::new(resources.base_dir().map(Path::to_path_buf));
            engine.html_processor(configuration, sink, resources, Box::new(rewriter))
        }
    }
    .map_err(ReportError::from_render)?;

    let mut guard = ProcessorGuard::new(processor);
    guard.process(template).map_err(ReportError::from_render)?;
    guard.close().map_err(ReportError::from_render)
}

/// Flush the caller's stream after rendering.
pub fn flush(sink: &mut dyn Write) -> Result<(), ReportError> {
    sink.flush()
        .map_err(|e| ReportError::InvalidOutput(format!("flush failed: {}", e)))
}
