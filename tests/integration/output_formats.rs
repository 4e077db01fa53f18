//! Output files written by the classic engine

use super::test_utils::TestWorkspace;
use reportkit::engine::ClassicEngine;
use reportkit::{OutputFormat, ParameterSet, ReportError, ReportGenerator, ReportService};
use std::fs;
use std::sync::Arc;

fn sales_generator(workspace: &TestWorkspace) -> Box<dyn ReportGenerator> {
    let config = workspace.sales_config();
    let mut service = ReportService::new(config.service, Arc::new(ClassicEngine::new()));
    service.start(&config.reports).unwrap();
    service
        .get_generator(
            "sales",
            ParameterSet::new()
                .with("SQL_DATE", "2024-01-01")
                .with("title", "Q1"),
        )
        .unwrap()
}

#[test]
fn test_pdf_file_is_complete() {
    let workspace = TestWorkspace::with_sales_report();
    let generator = sales_generator(&workspace);
    let out = workspace.path().join("out").join("sales.pdf");
    fs::create_dir_all(out.parent().unwrap()).unwrap();

    generator
        .generate_to_file(OutputFormat::Pdf, Some(&out))
        .unwrap();

    let bytes = fs::read(&out).unwrap();
    assert!(bytes.len() > 0);
    assert!(bytes.starts_with(b"%PDF-"));
    let tail = String::from_utf8_lossy(&bytes[bytes.len().saturating_sub(64)..]).to_string();
    assert!(tail.contains("%%EOF"));
}

#[test]
fn test_excel_file_is_workbook() {
    let workspace = TestWorkspace::with_sales_report();
    let generator = sales_generator(&workspace);
    let out = workspace.path().join("sales.xls");

    generator
        .generate_to_file(OutputFormat::Excel, Some(&out))
        .unwrap();

    let xml = fs::read_to_string(&out).unwrap();
    assert!(xml.contains(r#"<?mso-application progid="Excel.Sheet"?>"#));
    assert!(xml.contains(r#"<Worksheet ss:Name="Sales Q1">"#));
    assert!(xml.contains(r#"<Data ss:Type="Number">120.5</Data>"#));
    assert!(xml.trim_end().ends_with("</Workbook>"));
}

#[test]
fn test_html_file_is_single_document() {
    let workspace = TestWorkspace::with_sales_report();
    let generator = sales_generator(&workspace);
    let out = workspace.path().join("sales.html");

    generator
        .generate_to_file(OutputFormat::Html, Some(&out))
        .unwrap();

    let html = fs::read_to_string(&out).unwrap();
    assert_eq!(html.matches("<html>").count(), 1);
    assert!(html.contains("<p>Regional totals</p>"));
    assert!(html.contains(r#"<p class="footer">Internal</p>"#));
}

#[test]
fn test_unwritable_destination_is_invalid_output() {
    let workspace = TestWorkspace::with_sales_report();
    let generator = sales_generator(&workspace);
    let out = workspace.path().join("missing-dir").join("sales.pdf");

    assert!(matches!(
        generator.generate_to_file(OutputFormat::Pdf, Some(&out)),
        Err(ReportError::InvalidOutput(_))
    ));
    assert!(!out.exists());
}

#[test]
fn test_unknown_column_is_processing_error() {
    let workspace = TestWorkspace::with_sales_report();
    workspace.write(
        "reports/sales.toml",
        "[report]\ntitle = \"Broken\"\n[[columns]]\nfield = \"margin\"\n",
    );
    let generator = sales_generator(&workspace);
    let out = workspace.path().join("broken.html");

    match generator.generate_to_file(OutputFormat::Html, Some(&out)) {
        Err(ReportError::ReportProcessing(inner)) => {
            assert!(inner.to_string().contains("margin"))
        }
        other => panic!("unexpected result: {:?}", other),
    }
}
