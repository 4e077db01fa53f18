//! CLI route: single route table and run context. Dispatches to the report service and presentation.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_report_list_json, format_report_list_text, format_validation_json,
    format_validation_text, ValidationReport,
};
use crate::config::{ConfigLoader, ReportKitConfig};
use crate::engine::{ClassicEngine, OutputFormat, RenderEngine};
use crate::error::ReportError;
use crate::generator::GeneratorRegistry;
use crate::params::{ParameterSet, ParameterValue};
use crate::service::ReportService;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime context for CLI execution: workspace, loaded configuration and engine.
pub struct RunContext {
    workspace_root: PathBuf,
    config: ReportKitConfig,
    engine: Arc<dyn RenderEngine>,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        debug: bool,
    ) -> Result<Self, ReportError> {
        let mut config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        if debug {
            config.service.debug = true;
        }
        Ok(Self::with_config(workspace_root, config))
    }

    /// Run context over an already loaded configuration.
    pub fn with_config(workspace_root: PathBuf, config: ReportKitConfig) -> Self {
        Self {
            workspace_root,
            config,
            engine: Arc::new(ClassicEngine::new()),
        }
    }

    pub fn config(&self) -> &ReportKitConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    ///
    /// Returns text for stdout; empty when the report itself went to stdout.
    pub fn execute(&self, command: &Commands) -> Result<String, ReportError> {
        debug!(workspace = %self.workspace_root.display(), "Executing command");
        match command {
            Commands::Generate {
                report,
                format,
                output,
                params,
            } => self.handle_generate(report, *format, output.as_deref(), params),
            Commands::List { format } => self.handle_list(format),
            Commands::Validate { format } => self.handle_validate(format),
        }
    }

    fn start_service(&self) -> Result<ReportService, ReportError> {
        self.config.ensure_valid()?;
        let mut service = ReportService::new(self.config.service.clone(), Arc::clone(&self.engine));
        service.start(&self.config.reports)?;
        Ok(service)
    }

    fn handle_generate(
        &self,
        report: &str,
        format: OutputFormat,
        output: Option<&Path>,
        params: &[(String, ParameterValue)],
    ) -> Result<String, ReportError> {
        let service = self.start_service()?;
        let parameters: ParameterSet = params.iter().cloned().collect();
        let generator = service.get_generator(report, parameters)?;

        match output.filter(|p| p.as_os_str() != "-") {
            Some(path) => {
                let path = if path.is_dir() {
                    path.join(format!("{}.{}", report, format.extension()))
                } else {
                    path.to_path_buf()
                };
                generator.generate_to_file(format, Some(&path))?;
                info!(report, output = %path.display(), "Report written");
                Ok(format!(
                    "Wrote {} report '{}' to {}",
                    format,
                    report,
                    path.display()
                ))
            }
            None => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                generator.generate(format, Some(&mut handle as &mut dyn Write))?;
                Ok(String::new())
            }
        }
    }

    fn handle_list(&self, format: &str) -> Result<String, ReportError> {
        let service = self.start_service()?;
        let registry = service.definitions()?;
        match format {
            "json" => Ok(format_report_list_json(&registry)),
            "text" => Ok(format_report_list_text(&registry)),
            other => Err(ReportError::IllegalArgument(format!(
                "unknown list format '{}' (expected text or json)",
                other
            ))),
        }
    }

    fn handle_validate(&self, format: &str) -> Result<String, ReportError> {
        if !matches!(format, "text" | "json") {
            return Err(ReportError::IllegalArgument(format!(
                "unknown validate format '{}' (expected text or json)",
                format
            )));
        }
        let report = self.validate();
        let rendered = if format == "json" {
            format_validation_json(&report)
        } else {
            format_validation_text(&report)
        };
        if report.is_valid() {
            Ok(rendered)
        } else {
            Err(ReportError::ConfigError(rendered))
        }
    }

    /// Check configuration, strategy and every report's files.
    pub fn validate(&self) -> ValidationReport {
        let service = &self.config.service;
        let mut report = ValidationReport {
            generator: service.generator.clone(),
            ..ValidationReport::default()
        };

        if let Err(errors) = self.config.validate() {
            report.errors.extend(errors.iter().map(|e| e.to_string()));
        }
        if let Err(e) = GeneratorRegistry::with_defaults().resolve(&service.generator) {
            report.errors.push(e.to_string());
        }
        if let Err(e) = self.engine.boot() {
            report.errors.push(e.to_string());
            return report;
        }

        for entry in &self.config.reports {
            let (Some(name), Some(template)) = (&entry.name, &entry.template) else {
                continue;
            };
            report.reports_checked += 1;
            let template_path = service.resolve_path(template);
            if let Err(e) = self.engine.load_template(&template_path) {
                report.errors.push(format!("Report '{}': {}", name, e));
            }
            match &entry.query {
                Some(query) => {
                    let query_path = service.resolve_path(query);
                    if !query_path.is_file() {
                        report.errors.push(format!(
                            "Report '{}': query file {} not found",
                            name,
                            query_path.display()
                        ));
                    }
                }
                None if service.connection().is_some() => report.warnings.push(format!(
                    "Report '{}': no query file; generation with the configured connection will fail",
                    name
                )),
                None => {}
            }
        }
        report
    }
}
