//! Configuration System
//!
//! Layered configuration for the report service: built-in defaults, the user's
//! global file, workspace files, then `REPORTKIT_<SECTION>__<KEY>` environment
//! overrides. Validation reports every problem at once.

use crate::connection::ConnectionInfo;
use crate::error::ReportError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

mod loader;
mod merge;
mod sources;

pub use loader::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportKitConfig {
    /// Service settings
    #[serde(default)]
    pub service: ServiceConfig,

    /// Report definitions, in registration order
    #[serde(default)]
    pub reports: Vec<ReportEntry>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_service_name() -> String {
    "reports".to_string()
}

fn default_generator() -> String {
    "basic".to_string()
}

/// The `[service]` section.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Name the service is known by in logs
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Generator strategy id
    #[serde(default = "default_generator")]
    pub generator: String,

    #[serde(default)]
    pub debug: bool,

    #[serde(default, rename = "connection-driver", alias = "connection_driver")]
    pub connection_driver: Option<String>,

    #[serde(default, rename = "connection-url", alias = "connection_url")]
    pub connection_url: Option<String>,

    #[serde(default, rename = "connection-user", alias = "connection_user")]
    pub connection_user: Option<String>,

    #[serde(default, rename = "connection-password", alias = "connection_password")]
    pub connection_password: Option<String>,

    /// Directory relative report paths are resolved against
    #[serde(default, rename = "base-dir", alias = "base_dir")]
    pub base_dir: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            generator: default_generator(),
            debug: false,
            connection_driver: None,
            connection_url: None,
            connection_user: None,
            connection_password: None,
            base_dir: None,
        }
    }
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("name", &self.name)
            .field("generator", &self.generator)
            .field("debug", &self.debug)
            .field("connection_driver", &self.connection_driver)
            .field("connection_url", &self.connection_url)
            .field("connection_user", &self.connection_user)
            .field(
                "connection_password",
                &self.connection_password.as_ref().map(|_| "****"),
            )
            .field("base_dir", &self.base_dir)
            .finish()
    }
}

impl ServiceConfig {
    /// Connection info from the `connection-*` keys; `None` without a driver.
    pub fn connection(&self) -> Option<ConnectionInfo> {
        let driver = self.connection_driver.as_deref()?;
        Some(
            ConnectionInfo::new(driver, self.connection_url.clone().unwrap_or_default())
                .with_credentials(
                    self.connection_user.clone(),
                    self.connection_password.clone(),
                ),
        )
    }

    /// Resolve a report path against `base-dir`.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() && !path.as_os_str().is_empty() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Problems with the service settings; empty when usable.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.generator.trim().is_empty() {
            problems.push("generator strategy id cannot be empty".to_string());
        }
        let has = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        match (has(&self.connection_driver), has(&self.connection_url)) {
            (true, false) => problems.push("connection-driver set without connection-url".to_string()),
            (false, true) => problems.push("connection-url set without connection-driver".to_string()),
            _ => {}
        }
        problems
    }
}

/// One `[[reports]]` entry. Fields are optional so validation can name what is missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    #[serde(default)]
    pub name: Option<String>,

    /// Template file
    #[serde(default, alias = "report")]
    pub template: Option<PathBuf>,

    /// Query file
    #[serde(default, alias = "sql")]
    pub query: Option<PathBuf>,
}

impl ReportEntry {
    pub fn new(name: impl Into<String>, template: impl Into<PathBuf>) -> Self {
        Self {
            name: Some(name.into()),
            template: Some(template.into()),
            query: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<PathBuf>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Service(String),
    Report(String, String),
    Logging(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::Service(msg) => write!(f, "Service: {}", msg),
            ValidationError::Report(name, msg) => write!(f, "Report '{}': {}", name, msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl ReportKitConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors: Vec<ValidationError> = self
            .service
            .problems()
            .into_iter()
            .map(ValidationError::Service)
            .collect();

        let mut seen = HashSet::new();
        for (position, entry) in self.reports.iter().enumerate() {
            let label = entry
                .name
                .clone()
                .unwrap_or_else(|| format!("#{}", position + 1));
            match entry.name.as_deref().map(str::trim) {
                None | Some("") => {
                    errors.push(ValidationError::Report(label.clone(), "missing name".to_string()))
                }
                Some(name) => {
                    if !seen.insert(name.to_string()) {
                        errors.push(ValidationError::Report(
                            label.clone(),
                            "duplicate report name".to_string(),
                        ));
                    }
                }
            }
            if entry
                .template
                .as_ref()
                .map_or(true, |t| t.as_os_str().is_empty())
            {
                errors.push(ValidationError::Report(label, "missing template".to_string()));
            }
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            errors.push(ValidationError::Logging(format!(
                "invalid format '{}'",
                self.logging.format
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and fold all problems into one `ConfigError`.
    pub fn ensure_valid(&self) -> Result<(), ReportError> {
        self.validate().map_err(|errors| {
            let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            ReportError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                error_msgs.join("\n")
            ))
        })
    }
}
