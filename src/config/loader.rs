//! Configuration loading facade.

use super::merge::merge_policy;
use super::sources::{global_file, workspace_file};
use super::ReportKitConfig;
use config::{ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

const ENV_PREFIX: &str = "REPORTKIT";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (lowest to highest): defaults, global file, workspace files,
    /// environment. `service.base-dir` defaults to `workspace_root`.
    pub fn load(workspace_root: &Path) -> Result<ReportKitConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let mut config: ReportKitConfig = builder
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        if config.service.base_dir.is_none() {
            config.service.base_dir = Some(workspace_root.to_path_buf());
        }
        debug!(
            workspace = %workspace_root.display(),
            reports = config.reports.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from a single file plus environment overrides.
    ///
    /// `service.base-dir` defaults to the file's directory.
    pub fn load_from_file(path: &Path) -> Result<ReportKitConfig, ConfigError> {
        let mut config: ReportKitConfig = merge_policy::builder_with_defaults()?
            .add_source(File::from(path).required(true))
            .add_source(environment())
            .build()?
            .try_deserialize()?;

        if config.service.base_dir.is_none() {
            config.service.base_dir = path.parent().map(Path::to_path_buf);
        }
        debug!(config_file = %path.display(), reports = config.reports.len(), "Configuration loaded");
        Ok(config)
    }

    /// Path of the global configuration file, if a home directory is known.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
