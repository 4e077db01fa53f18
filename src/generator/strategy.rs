//! Generator strategy registry.

use super::{BasicReportGenerator, EmbeddedReportGenerator, GeneratorSettings, ReportGenerator};
use crate::engine::RenderEngine;
use crate::error::ReportError;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builds a generator for one request.
pub type GeneratorConstructor =
    fn(Arc<dyn RenderEngine>, GeneratorSettings) -> Box<dyn ReportGenerator>;

/// Strategy id to constructor.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    constructors: BTreeMap<String, GeneratorConstructor>,
}

impl fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

impl GeneratorRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the `basic` and `embedded` strategies.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("basic", BasicReportGenerator::boxed);
        registry.register("embedded", EmbeddedReportGenerator::boxed);
        registry
    }

    /// Register `constructor` under `id`, replacing any previous one.
    pub fn register(&mut self, id: impl Into<String>, constructor: GeneratorConstructor) {
        let id = id.into();
        debug!(strategy = %id, "Registered generator strategy");
        self.constructors.insert(id, constructor);
    }

    pub fn resolve(&self, id: &str) -> Result<GeneratorConstructor, ReportError> {
        self.constructors.get(id).copied().ok_or_else(|| {
            ReportError::ConfigError(format!(
                "unknown generator strategy '{}' (known: {})",
                id,
                self.ids().join(", ")
            ))
        })
    }

    pub fn ids(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}
