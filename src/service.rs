//! Report Service
//!
//! The managed component: owns the service configuration, the render engine
//! handle, and once started the report registry and selected generator
//! strategy. Hands out configured generators by report name.

use crate::config::{ReportEntry, ServiceConfig};
use crate::engine::RenderEngine;
use crate::error::ReportError;
use crate::generator::{GeneratorConstructor, GeneratorRegistry, GeneratorSettings, ReportGenerator};
use crate::params::ParameterSet;
use crate::registry::ReportRegistry;
use std::sync::Arc;
use tracing::{info, info_span};

struct Running {
    registry: Arc<ReportRegistry>,
    strategy: GeneratorConstructor,
}

/// Report service component.
pub struct ReportService {
    config: ServiceConfig,
    engine: Arc<dyn RenderEngine>,
    generators: GeneratorRegistry,
    running: Option<Running>,
}

impl ReportService {
    pub fn new(config: ServiceConfig, engine: Arc<dyn RenderEngine>) -> Self {
        Self {
            config,
            engine,
            generators: GeneratorRegistry::with_defaults(),
            running: None,
        }
    }

    /// Use `generators` instead of the default strategies.
    pub fn with_generators(mut self, generators: GeneratorRegistry) -> Self {
        self.generators = generators;
        self
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn is_started(&self) -> bool {
        self.running.is_some()
    }

    /// Boot the engine, resolve the strategy and build the registry from `entries`.
    pub fn start(&mut self, entries: &[ReportEntry]) -> Result<(), ReportError> {
        let problems = self.config.problems();
        if !problems.is_empty() {
            return Err(ReportError::ConfigError(problems.join("; ")));
        }
        self.engine
            .boot()
            .map_err(|e| ReportError::ConfigError(format!("engine boot failed: {}", e)))?;
        let strategy = self.generators.resolve(&self.config.generator)?;
        let registry = ReportRegistry::from_entries(entries)?;

        info!(
            service = %self.config.name,
            engine = self.engine.name(),
            generator = %self.config.generator,
            reports = registry.len(),
            "Report service started"
        );
        self.running = Some(Running {
            registry: Arc::new(registry),
            strategy,
        });
        Ok(())
    }

    /// Drop the registry. The service can be started again.
    pub fn stop(&mut self) {
        if self.running.take().is_some() {
            info!(service = %self.config.name, "Report service stopped");
        }
    }

    /// Registered report definitions.
    pub fn definitions(&self) -> Result<Arc<ReportRegistry>, ReportError> {
        self.running()
            .map(|running| Arc::clone(&running.registry))
    }

    /// A generator for report `name`, configured with `parameters`.
    ///
    /// Does not touch the filesystem; missing files surface when generating.
    pub fn get_generator(
        &self,
        name: &str,
        parameters: ParameterSet,
    ) -> Result<Box<dyn ReportGenerator>, ReportError> {
        let running = self.running()?;
        let definition = running.registry.lookup(name)?;

        let span = info_span!("report", service = %self.config.name, report = %name);
        let mut settings = GeneratorSettings::new(self.config.resolve_path(&definition.template_path))
            .with_parameters(parameters)
            .with_debug(self.config.debug)
            .with_span(span);
        if let Some(query_path) = &definition.query_path {
            settings = settings.with_query(self.config.resolve_path(query_path));
        }
        if let Some(connection) = self.config.connection() {
            settings = settings.with_connection(match &self.config.base_dir {
                Some(base) => connection.resolve_relative(base),
                None => connection,
            });
        }

        Ok((running.strategy)(Arc::clone(&self.engine), settings))
    }

    fn running(&self) -> Result<&Running, ReportError> {
        self.running.as_ref().ok_or_else(|| {
            ReportError::ConfigError(format!("service '{}' is not started", self.config.name))
        })
    }
}
