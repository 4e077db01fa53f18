//! Shared test utilities for integration tests
//!
//! A temporary workspace with report templates, query files and a small
//! SQLite sales database.

use reportkit::config::{ReportEntry, ReportKitConfig, ServiceConfig};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SALES_TEMPLATE: &str = r#"
[report]
title = "Sales ${title}"
header = "Regional totals"
footer = "Internal"

[[columns]]
field = "region"
header = "Region"
width = 2.0

[[columns]]
field = "total"
header = "Total"
"#;

pub const SALES_QUERY: &str =
    "SELECT region, total FROM sales WHERE d = '@SQL_DATE@' ORDER BY region";

pub struct TestWorkspace {
    temp: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Write `contents` at `relative`, creating parent directories.
    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.temp.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    /// Create `data/sales.db` with three rows over two dates.
    pub fn sales_db(&self) -> PathBuf {
        let path = self.temp.path().join("data").join("sales.db");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE sales (region TEXT, total REAL, d TEXT);
             INSERT INTO sales VALUES ('north', 120.5, '2024-01-01');
             INSERT INTO sales VALUES ('south', 80, '2024-01-01');
             INSERT INTO sales VALUES ('west', 10, '2024-02-01');",
        )
        .unwrap();
        path
    }

    /// Workspace with the sales report, its query and database.
    pub fn with_sales_report() -> Self {
        let workspace = Self::new();
        workspace.write("reports/sales.toml", SALES_TEMPLATE);
        workspace.write("reports/sales.sql", SALES_QUERY);
        workspace.sales_db();
        workspace
    }

    /// Configuration pointing at the sales report and database.
    pub fn sales_config(&self) -> ReportKitConfig {
        ReportKitConfig {
            service: ServiceConfig {
                connection_driver: Some("sqlite".to_string()),
                connection_url: Some("data/sales.db".to_string()),
                base_dir: Some(self.path().to_path_buf()),
                ..ServiceConfig::default()
            },
            reports: vec![ReportEntry::new("sales", "reports/sales.toml")
                .with_query("reports/sales.sql")],
            ..ReportKitConfig::default()
        }
    }
}
