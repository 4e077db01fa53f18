//! Spreadsheet output as a SpreadsheetML 2003 workbook.
//!
//! A flow layout: one worksheet, a bold header row, then one row per record.
//! No pagination.

use crate::engine::data::CellValue;
use crate::engine::template::{ReportContent, Template};
use crate::engine::OutputProcessor;
use crate::error::EngineError;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fmt;
use std::io::Write;
use tracing::debug;

const SHEET_NAME_LIMIT: usize = 31;
const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";

/// Flow-table processor writing a workbook.
pub struct ExcelOutputProcessor<'a> {
    sink: &'a mut dyn Write,
}

impl<'a> ExcelOutputProcessor<'a> {
    pub fn new(sink: &'a mut dyn Write) -> Self {
        Self { sink }
    }
}

impl OutputProcessor for ExcelOutputProcessor<'_> {
    fn process(&mut self, template: &Template) -> Result<(), EngineError> {
        let content = template.content()?;
        let bytes = write_workbook(&content)?;
        self.sink.write_all(&bytes)?;
        debug!(rows = content.table.len(), bytes = bytes.len(), "Workbook written");
        Ok(())
    }

    fn close(&mut self) -> Result<(), EngineError> {
        self.sink.flush()?;
        Ok(())
    }
}

fn write_workbook(content: &ReportContent) -> Result<Vec<u8>, EngineError> {
    let mut xml = SheetWriter {
        writer: Writer::new_with_indent(Vec::new(), b' ', 1),
    };
    xml.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    xml.event(Event::PI(BytesPI::new(r#"mso-application progid="Excel.Sheet""#)))?;
    xml.start("Workbook", &[("xmlns", SPREADSHEET_NS), ("xmlns:ss", SPREADSHEET_NS)])?;

    xml.start("Styles", &[])?;
    xml.start("Style", &[("ss:ID", "header")])?;
    xml.empty("Font", &[("ss:Bold", "1")])?;
    xml.end("Style")?;
    xml.start("Style", &[("ss:ID", "title")])?;
    xml.empty("Font", &[("ss:Bold", "1"), ("ss:Size", "14")])?;
    xml.end("Style")?;
    xml.end("Styles")?;

    let name = sheet_name(&content.title);
    xml.start("Worksheet", &[("ss:Name", name.as_str())])?;
    xml.start("Table", &[])?;

    if !content.title.is_empty() {
        xml.text_row(Some("title"), &content.title)?;
    }
    if let Some(header) = &content.header {
        xml.text_row(None, header)?;
    }

    xml.start("Row", &[])?;
    for column in &content.columns {
        xml.start("Cell", &[("ss:StyleID", "header")])?;
        xml.data("String", &column.header)?;
        xml.end("Cell")?;
    }
    xml.end("Row")?;

    for row in &content.table.rows {
        xml.start("Row", &[])?;
        for column in &content.columns {
            xml.cell(ReportContent::cell(row, column))?;
        }
        xml.end("Row")?;
    }

    if let Some(footer) = &content.footer {
        xml.text_row(None, footer)?;
    }

    xml.end("Table")?;
    xml.end("Worksheet")?;
    xml.end("Workbook")?;
    Ok(xml.writer.into_inner())
}

struct SheetWriter {
    writer: Writer<Vec<u8>>,
}

impl SheetWriter {
    fn event(&mut self, event: Event<'_>) -> Result<(), EngineError> {
        self.writer.write_event(event).map_err(encoding_error)
    }

    fn start(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), EngineError> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Start(element))
    }

    fn empty(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<(), EngineError> {
        let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Empty(element))
    }

    fn end(&mut self, name: &str) -> Result<(), EngineError> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn data(&mut self, kind: &str, text: &str) -> Result<(), EngineError> {
        self.start("Data", &[("ss:Type", kind)])?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.end("Data")
    }

    fn text_row(&mut self, style: Option<&str>, text: &str) -> Result<(), EngineError> {
        self.start("Row", &[])?;
        match style {
            Some(style) => self.start("Cell", &[("ss:StyleID", style)])?,
            None => self.start("Cell", &[])?,
        }
        self.data("String", text)?;
        self.end("Cell")?;
        self.end("Row")
    }

    fn cell(&mut self, value: &CellValue) -> Result<(), EngineError> {
        let kind = match value {
            CellValue::Null => return self.empty("Cell", &[]),
            CellValue::Integer(_) => "Number",
            CellValue::Real(x) if x.is_finite() => "Number",
            _ => "String",
        };
        self.start("Cell", &[])?;
        self.data(kind, &value.to_string())?;
        self.end("Cell")
    }
}

fn encoding_error(err: impl fmt::Display) -> EngineError {
    EngineError::Render(format!("workbook encoding failed: {}", err))
}

/// Worksheet names: at most 31 chars, none of `[]:*?/\`.
fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(SHEET_NAME_LIMIT)
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "Report".to_string()
    } else {
        trimmed.to_string()
    }
}
