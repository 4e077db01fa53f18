//! Report Definition Registry
//!
//! Maps report names to their template and query files. Built once when the
//! service starts and read-only afterwards.

use crate::config::ReportEntry;
use crate::error::ReportError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A named report: template file plus optional query file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDefinition {
    pub name: String,
    pub template_path: PathBuf,
    pub query_path: Option<PathBuf>,
}

impl ReportDefinition {
    pub fn new(name: impl Into<String>, template_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            template_path: template_path.into(),
            query_path: None,
        }
    }

    pub fn with_query(mut self, query_path: impl Into<PathBuf>) -> Self {
        self.query_path = Some(query_path.into());
        self
    }
}

/// Registry of report definitions, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ReportRegistry {
    definitions: Vec<ReportDefinition>,
    index: HashMap<String, usize>,
}

impl ReportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration entries, in order.
    pub fn from_entries(entries: &[ReportEntry]) -> Result<Self, ReportError> {
        let mut registry = Self::new();
        for entry in entries {
            let name = entry
                .name
                .clone()
                .ok_or_else(|| ReportError::ConfigError("missing report name".to_string()))?;
            let template = entry.template.clone().unwrap_or_default();
            let mut definition = ReportDefinition::new(name, template);
            definition.query_path = entry.query.clone();
            registry.register(definition)?;
        }
        Ok(registry)
    }

    /// Register a definition.
    pub fn register(&mut self, definition: ReportDefinition) -> Result<(), ReportError> {
        if definition.name.trim().is_empty() {
            return Err(ReportError::ConfigError("missing report name".to_string()));
        }
        if definition.template_path.as_os_str().is_empty() {
            return Err(ReportError::ConfigError(format!(
                "report '{}' has no template",
                definition.name
            )));
        }
        if self.index.contains_key(&definition.name) {
            return Err(ReportError::ConfigError(format!(
                "duplicate report name: {}",
                definition.name
            )));
        }
        debug!(
            report = %definition.name,
            template = %definition.template_path.display(),
            "Registered report"
        );
        self.index
            .insert(definition.name.clone(), self.definitions.len());
        self.definitions.push(definition);
        Ok(())
    }

    /// Definition registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<&ReportDefinition, ReportError> {
        self.index
            .get(name)
            .map(|&i| &self.definitions[i])
            .ok_or_else(|| ReportError::ConfigError(format!("missing report: {}", name)))
    }

    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReportDefinition> {
        self.definitions.iter()
    }

    pub fn template_path(&self, name: &str) -> Result<&Path, ReportError> {
        self.lookup(name).map(|d| d.template_path.as_path())
    }
}
