//! CLI presentation: text and json formatters for list and validate.

use crate::registry::ReportRegistry;
use comfy_table::Table;
use serde::Serialize;
use serde_json::json;

/// Outcome of `reportkit validate`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub generator: String,
    pub reports_checked: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn format_report_list_text(registry: &ReportRegistry) -> String {
    if registry.is_empty() {
        return "No reports registered.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Name", "Template", "Query"]);
    for definition in registry.iter() {
        let query = definition
            .query_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            definition.name.clone(),
            definition.template_path.display().to_string(),
            query,
        ]);
    }
    format!("{}\n\nTotal: {} report(s)", table, registry.len())
}

pub fn format_report_list_json(registry: &ReportRegistry) -> String {
    let reports: Vec<_> = registry
        .iter()
        .map(|definition| {
            json!({
                "name": definition.name,
                "template": definition.template_path,
                "query": definition.query_path,
            })
        })
        .collect();
    let out = json!({ "reports": reports, "total": registry.len() });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}

pub fn format_validation_text(report: &ValidationReport) -> String {
    let mut s = if report.is_valid() {
        format!(
            "Validation passed:\n  Generator: {}\n  Reports: {}",
            report.generator, report.reports_checked
        )
    } else {
        format!(
            "Validation completed with issues:\n  Generator: {}\n  Reports: {}",
            report.generator, report.reports_checked
        )
    };
    if !report.errors.is_empty() {
        s.push_str(&format!("\n\nErrors ({}):", report.errors.len()));
        for e in &report.errors {
            s.push_str(&format!("\n  - {}", e));
        }
    }
    if !report.warnings.is_empty() {
        s.push_str(&format!("\n\nWarnings ({}):", report.warnings.len()));
        for w in &report.warnings {
            s.push_str(&format!("\n  - {}", w));
        }
    }
    s
}

pub fn format_validation_json(report: &ValidationReport) -> String {
    let out = json!({
        "valid": report.is_valid(),
        "generator": report.generator,
        "reports_checked": report.reports_checked,
        "errors": report.errors,
        "warnings": report.warnings,
    });
    serde_json::to_string_pretty(&out).unwrap_or_else(|_| "{}".to_string())
}
