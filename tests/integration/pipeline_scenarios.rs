//! End-to-end pipeline scenarios against the recording and classic engines

use super::test_utils::{TestWorkspace, SALES_TEMPLATE};
use reportkit::config::ReportEntry;
use reportkit::connection::REPORT_QUERY;
use reportkit::engine::{ClassicEngine, RecordingEngine, RenderEngine};
use reportkit::generator::{BasicReportGenerator, GeneratorSettings};
use reportkit::{OutputFormat, ParameterSet, ParameterValue, ReportError, ReportGenerator, ReportService};
use std::fs;
use std::io::Write;
use std::sync::Arc;

fn recording_service(workspace: &TestWorkspace, engine: &RecordingEngine) -> ReportService {
    let config = workspace.sales_config();
    let mut service = ReportService::new(config.service, Arc::new(engine.clone()));
    service.start(&config.reports).unwrap();
    service
}

#[test]
fn test_sales_scenario_engine_receives_substituted_query() {
    let workspace = TestWorkspace::new();
    workspace.write("reports/sales.toml", SALES_TEMPLATE);
    workspace.write("reports/sales.sql", "SELECT * FROM t WHERE d=@SQL_DATE@");
    let engine = RecordingEngine::new();
    let service = recording_service(&workspace, &engine);

    let parameters = ParameterSet::new()
        .with("SQL_DATE", "2024-01-01")
        .with("title", "Q1");
    let generator = service.get_generator("sales", parameters).unwrap();

    let mut out = Vec::new();
    generator
        .generate(OutputFormat::Pdf, Some(&mut out as &mut dyn Write))
        .unwrap();

    let record = engine.last_render().unwrap();
    assert_eq!(record.query_name, REPORT_QUERY);
    assert_eq!(
        record.query_text.as_deref(),
        Some("SELECT * FROM t WHERE d=2024-01-01")
    );
    assert_eq!(
        record.parameters.get("title"),
        Some(&ParameterValue::from("Q1"))
    );
    assert!(!record.parameters.contains_key("SQL_DATE"));
    assert!(!out.is_empty());
}

#[test]
fn test_each_format_closes_processor_once() {
    let workspace = TestWorkspace::with_sales_report();
    let engine = RecordingEngine::new();
    let service = recording_service(&workspace, &engine);

    for (i, format) in [OutputFormat::Pdf, OutputFormat::Html, OutputFormat::Excel]
        .into_iter()
        .enumerate()
    {
        let generator = service.get_generator("sales", ParameterSet::new()).unwrap();
        let mut out = Vec::new();
        generator
            .generate(format, Some(&mut out as &mut dyn Write))
            .unwrap();
        assert!(!out.is_empty());
        assert_eq!(engine.processors_opened(), i + 1);
        assert_eq!(engine.processors_closed(), i + 1);
        assert_eq!(engine.last_render().unwrap().format, format);
    }
}

#[test]
fn test_processing_failure_still_closes_processor() {
    let workspace = TestWorkspace::with_sales_report();
    let engine = RecordingEngine::failing("page overflow");
    let service = recording_service(&workspace, &engine);

    let generator = service.get_generator("sales", ParameterSet::new()).unwrap();
    let mut out = Vec::new();
    let result = generator.generate(OutputFormat::Html, Some(&mut out as &mut dyn Write));
    assert!(matches!(result, Err(ReportError::ReportProcessing(_))));
    assert_eq!(engine.processors_opened(), 1);
    assert_eq!(engine.processors_closed(), 1);
}

#[test]
fn test_missing_destination_does_no_work() {
    let workspace = TestWorkspace::with_sales_report();
    let engine = RecordingEngine::new();
    let service = recording_service(&workspace, &engine);
    let generator = service.get_generator("sales", ParameterSet::new()).unwrap();

    assert!(matches!(
        generator.generate(OutputFormat::Pdf, None),
        Err(ReportError::IllegalArgument(_))
    ));
    assert!(matches!(
        generator.generate_to_file(OutputFormat::Pdf, None),
        Err(ReportError::IllegalArgument(_))
    ));
    assert!(engine.templates_loaded().is_empty());
    assert_eq!(engine.processors_opened(), 0);
    assert_eq!(fs::read_dir(workspace.path()).unwrap().count(), 2);
}

#[test]
fn test_missing_query_file() {
    let workspace = TestWorkspace::new();
    workspace.write("reports/sales.toml", SALES_TEMPLATE);
    workspace.sales_db();
    let engine = RecordingEngine::new();
    let service = recording_service(&workspace, &engine);

    let generator = service.get_generator("sales", ParameterSet::new()).unwrap();
    let mut out = Vec::new();
    assert!(matches!(
        generator.generate(OutputFormat::Html, Some(&mut out as &mut dyn Write)),
        Err(ReportError::QueryNotFound { .. })
    ));
    assert_eq!(engine.processors_opened(), 0);
}

#[test]
fn test_missing_template_file() {
    let workspace = TestWorkspace::new();
    workspace.write("reports/sales.sql", "SELECT 1");
    let engine = RecordingEngine::new();
    let service = recording_service(&workspace, &engine);

    let generator = service.get_generator("sales", ParameterSet::new()).unwrap();
    let mut out = Vec::new();
    assert!(matches!(
        generator.generate(OutputFormat::Html, Some(&mut out as &mut dyn Write)),
        Err(ReportError::ReportNotFound { .. })
    ));
}

#[test]
fn test_classic_engine_reads_sqlite_rows() {
    let workspace = TestWorkspace::with_sales_report();
    let config = workspace.sales_config();
    let engine = Arc::new(ClassicEngine::new());
    let mut service = ReportService::new(config.service, engine);
    service.start(&config.reports).unwrap();

    let generator = service
        .get_generator(
            "sales",
            ParameterSet::new()
                .with("SQL_DATE", "2024-01-01")
                .with("title", "Q1"),
        )
        .unwrap();
    let mut out = Vec::new();
    generator
        .generate(OutputFormat::Html, Some(&mut out as &mut dyn Write))
        .unwrap();

    let html = String::from_utf8(out).unwrap();
    assert!(html.contains("<h1>Sales Q1</h1>"));
    assert!(html.contains("<td>north</td>"));
    assert!(html.contains(r#"<td class="num">120.5</td>"#));
    assert!(html.contains("<td>south</td>"));
    assert!(!html.contains("west"));
}

#[test]
fn test_named_statement_parameters_bound_from_report_parameters() {
    let workspace = TestWorkspace::with_sales_report();
    workspace.write(
        "reports/by_region.sql",
        "SELECT region, total FROM sales WHERE region = :region",
    );
    let mut config = workspace.sales_config();
    config.reports.push(
        ReportEntry::new("by_region", "reports/sales.toml").with_query("reports/by_region.sql"),
    );
    let mut service = ReportService::new(config.service, Arc::new(ClassicEngine::new()));
    service.start(&config.reports).unwrap();

    let generator = service
        .get_generator("by_region", ParameterSet::new().with("region", "west"))
        .unwrap();
    let mut out = Vec::new();
    generator
        .generate(OutputFormat::Excel, Some(&mut out as &mut dyn Write))
        .unwrap();

    let xml = String::from_utf8(out).unwrap();
    assert!(xml.contains(r#"<Data ss:Type="String">west</Data>"#));
    assert!(!xml.contains("north"));
}

#[test]
fn test_generator_requires_booted_engine() {
    let workspace = TestWorkspace::with_sales_report();
    let engine: Arc<dyn RenderEngine> = Arc::new(ClassicEngine::new());
    let generator = BasicReportGenerator::new(
        Arc::clone(&engine),
        GeneratorSettings::new(workspace.path().join("reports/sales.toml")),
    );
    let mut out = Vec::new();
    assert!(matches!(
        generator.generate(OutputFormat::Html, Some(&mut out as &mut dyn Write)),
        Err(ReportError::ReportNotFound { .. })
    ));

    engine.boot().unwrap();
    generator
        .generate(OutputFormat::Html, Some(&mut out as &mut dyn Write))
        .unwrap();
    assert!(!out.is_empty());
}
