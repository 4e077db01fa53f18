//! Configuration loading: files, environment overrides, validation

use super::test_utils::TestWorkspace;
use reportkit::config::{ConfigLoader, ValidationError};
use reportkit::engine::RecordingEngine;
use reportkit::{ParameterSet, ReportService};
use std::sync::{Arc, Mutex};

// Serializes tests that set REPORTKIT_* variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const SERVICE_FILE: &str = r#"
[service]
name = "finance"
debug = true
connection-driver = "sqlite"
connection-url = "data/sales.db"
connection-user = "sa"
connection-password = "secret"

[[reports]]
name = "sales"
report = "reports/sales.toml"
sql = "reports/sales.sql"

[logging]
level = "debug"
format = "json"
"#;

#[test]
fn test_service_file_drives_generator_settings() {
    let workspace = TestWorkspace::with_sales_report();
    let config_file = workspace.write("service.toml", SERVICE_FILE);

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.logging.format, "json");

    let engine = RecordingEngine::new();
    let mut service = ReportService::new(config.service.clone(), Arc::new(engine));
    service.start(&config.reports).unwrap();
    let generator = service.get_generator("sales", ParameterSet::new()).unwrap();

    let settings = generator.settings();
    assert!(settings.debug);
    assert_eq!(
        settings.template_path,
        workspace.path().join("reports/sales.toml")
    );
    let connection = settings.connection.as_ref().unwrap();
    assert_eq!(connection.user.as_deref(), Some("sa"));
    assert_eq!(
        connection.url,
        workspace.path().join("data/sales.db").display().to_string()
    );
    assert!(!format!("{:?}", connection).contains("secret"));
}

#[test]
fn test_environment_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let workspace = TestWorkspace::new();
    let config_file = workspace.write("service.toml", SERVICE_FILE);

    std::env::set_var("REPORTKIT_SERVICE__NAME", "from-env");
    let loaded = ConfigLoader::load_from_file(&config_file);
    std::env::remove_var("REPORTKIT_SERVICE__NAME");

    let config = loaded.unwrap();
    assert_eq!(config.service.name, "from-env");
    assert_eq!(config.reports.len(), 1);
}

#[test]
fn test_workspace_env_file_overrides_base() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let workspace = TestWorkspace::new();
    workspace.write(
        "config/reportkit.toml",
        "[service]\ngenerator = \"basic\"\n\n[[reports]]\nname = \"a\"\ntemplate = \"a.toml\"\n",
    );
    workspace.write("config/staging.toml", "[service]\ngenerator = \"embedded\"\n");

    std::env::set_var("REPORTKIT_ENV", "staging");
    let loaded = ConfigLoader::load(workspace.path());
    std::env::remove_var("REPORTKIT_ENV");

    let config = loaded.unwrap();
    assert_eq!(config.service.generator, "embedded");
    assert_eq!(config.reports.len(), 1);
    assert_eq!(config.service.base_dir.as_deref(), Some(workspace.path()));
}

#[test]
fn test_invalid_file_reports_every_problem() {
    let workspace = TestWorkspace::new();
    let config_file = workspace.write(
        "bad.toml",
        r#"
[service]
generator = ""
connection-url = "x.db"

[[reports]]
name = "dup"
template = "a.toml"

[[reports]]
name = "dup"
"#,
    );

    let config = ConfigLoader::load_from_file(&config_file).unwrap();
    let errors = config.validate().unwrap_err();
    assert_eq!(errors.len(), 4);
    assert!(errors
        .iter()
        .any(|e| matches!(e, ValidationError::Service(msg) if msg.contains("connection-url"))));
}
