//! CLI route table: generate, list, validate

use super::test_utils::TestWorkspace;
use reportkit::cli::{Cli, Commands, RunContext};
use reportkit::ReportError;
use clap::Parser;
use std::fs;

fn context(workspace: &TestWorkspace) -> RunContext {
    RunContext::with_config(workspace.path().to_path_buf(), workspace.sales_config())
}

#[test]
fn test_generate_with_parsed_parameters() {
    let workspace = TestWorkspace::with_sales_report();
    let out = workspace.path().join("sales.xls");
    let cli = Cli::try_parse_from([
        "reportkit",
        "generate",
        "sales",
        "--format",
        "excel",
        "--output",
        out.to_str().unwrap(),
        "-p",
        "SQL_DATE=2024-02-01",
    ])
    .unwrap();

    let message = context(&workspace).execute(&cli.command).unwrap();
    assert!(message.starts_with("Wrote excel report 'sales'"));
    let xml = fs::read_to_string(&out).unwrap();
    assert!(xml.contains("west"));
    assert!(!xml.contains("north"));
}

#[test]
fn test_generate_into_directory_uses_format_extension() {
    let workspace = TestWorkspace::with_sales_report();
    let out_dir = workspace.path().join("out");
    fs::create_dir_all(&out_dir).unwrap();
    let cli = Cli::try_parse_from([
        "reportkit",
        "generate",
        "sales",
        "--format",
        "pdf",
        "-o",
        out_dir.to_str().unwrap(),
        "-p",
        "SQL_DATE=2024-01-01",
    ])
    .unwrap();

    let message = context(&workspace).execute(&cli.command).unwrap();
    let written = out_dir.join("sales.pdf");
    assert!(message.ends_with(&written.display().to_string()));
    assert!(fs::read(&written).unwrap().starts_with(b"%PDF"));
}

#[test]
fn test_query_parameter_text_is_not_retyped() {
    let workspace = TestWorkspace::with_sales_report();
    workspace.write(
        "reports/sales.sql",
        "SELECT region, total FROM sales WHERE '@SQL_CODE@' = '007' ORDER BY region",
    );
    let out = workspace.path().join("sales.html");
    let cli = Cli::try_parse_from([
        "reportkit",
        "generate",
        "sales",
        "-o",
        out.to_str().unwrap(),
        "-p",
        "SQL_CODE=007",
    ])
    .unwrap();

    context(&workspace).execute(&cli.command).unwrap();
    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("north"));
    assert!(html.contains("west"));
}

#[test]
fn test_list_json() {
    let workspace = TestWorkspace::with_sales_report();
    let output = context(&workspace)
        .execute(&Commands::List {
            format: "json".to_string(),
        })
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(parsed["total"], 1);
    assert_eq!(parsed["reports"][0]["name"], "sales");
}

#[test]
fn test_validate_passes_for_sales_workspace() {
    let workspace = TestWorkspace::with_sales_report();
    let output = context(&workspace)
        .execute(&Commands::Validate {
            format: "text".to_string(),
        })
        .unwrap();
    assert!(output.starts_with("Validation passed"));
}

#[test]
fn test_validate_fails_on_broken_template() {
    let workspace = TestWorkspace::with_sales_report();
    workspace.write("reports/sales.toml", "[report\n");
    match context(&workspace).execute(&Commands::Validate {
        format: "json".to_string(),
    }) {
        Err(ReportError::ConfigError(rendered)) => {
            let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
            assert_eq!(parsed["valid"], false);
            assert_eq!(parsed["errors"].as_array().unwrap().len(), 1);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_generate_unknown_report() {
    let workspace = TestWorkspace::with_sales_report();
    let result = context(&workspace).execute(&Commands::Generate {
        report: "unknown".to_string(),
        format: reportkit::OutputFormat::Html,
        output: Some(workspace.path().join("x.html")),
        params: vec![],
    });
    assert!(matches!(result, Err(ReportError::ConfigError(_))));
    assert!(!workspace.path().join("x.html").exists());
}
