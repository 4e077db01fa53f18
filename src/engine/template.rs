//! Report templates
//!
//! A template is a TOML document describing the title block, the columns to
//! lay out, default parameter values, page setup, and optionally its own data
//! (an embedded SQL source or inline rows). See `Template::parse`.

use crate::connection::{ConnectionInfo, SqlDataSource, REPORT_QUERY};
use crate::engine::data::{CellValue, DataFactory, ResultTable, TableDataFactory};
use crate::engine::resource::ResourceManager;
use crate::error::EngineError;
use crate::params::{ParameterTable, ParameterValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
    Legal,
}

impl PageSize {
    /// Portrait width and height in points.
    pub fn points(self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.0, 842.0),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageOrientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page setup shared by the output processors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfiguration {
    pub size: PageSize,
    pub orientation: PageOrientation,
    /// Margin on every side, in points
    pub margin: f64,
    /// Body font size, in points
    pub font_size: f64,
}

impl Default for ReportConfiguration {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            orientation: PageOrientation::Portrait,
            margin: 36.0,
            font_size: 10.0,
        }
    }
}

impl ReportConfiguration {
    /// Page width and height in points, orientation applied.
    pub fn page_dimensions(&self) -> (f64, f64) {
        let (w, h) = self.size.points();
        match self.orientation {
            PageOrientation::Portrait => (w, h),
            PageOrientation::Landscape => (h, w),
        }
    }

    fn validate(&self) -> Result<(), String> {
        let (w, h) = self.page_dimensions();
        if !(self.font_size > 0.0 && self.font_size <= 72.0) {
            return Err(format!("font_size must be in (0, 72], got {}", self.font_size));
        }
        if !(self.margin >= 0.0) || self.margin * 2.0 >= w.min(h) {
            return Err(format!("margin {} does not fit the page", self.margin));
        }
        Ok(())
    }
}

fn default_width() -> f64 {
    1.0
}

/// A column of the report table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub field: String,
    #[serde(default)]
    pub header: Option<String>,
    /// Relative width weight
    #[serde(default = "default_width")]
    pub width: f64,
    /// Cell values are resource paths rendered as links where the format supports it
    #[serde(default)]
    pub link: bool,
}

impl Column {
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            header: None,
            width: default_width(),
            link: false,
        }
    }

    pub fn header(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.field)
    }
}

/// A column bound to its position in the result set.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundColumn {
    pub header: String,
    pub index: usize,
    /// Share of the table width, all columns sum to 1
    pub width: f64,
    pub link: bool,
}

/// Everything a processor lays out: expanded text, bound columns, and rows.
#[derive(Debug, Clone)]
pub struct ReportContent {
    pub title: String,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub logo: Option<PathBuf>,
    pub columns: Vec<BoundColumn>,
    pub table: ResultTable,
}

static NULL_CELL: CellValue = CellValue::Null;

impl ReportContent {
    /// Value of `column` in `row`.
    pub fn cell<'a>(row: &'a [CellValue], column: &BoundColumn) -> &'a CellValue {
        row.get(column.index).unwrap_or(&NULL_CELL)
    }
}

#[derive(Debug, Deserialize)]
struct TemplateDocument {
    #[serde(default)]
    report: ReportSection,
    #[serde(default)]
    page: ReportConfiguration,
    #[serde(default)]
    parameters: ParameterTable,
    #[serde(default)]
    columns: Vec<Column>,
    #[serde(default)]
    data_source: Option<EmbeddedSource>,
    #[serde(default)]
    data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct ReportSection {
    #[serde(default)]
    title: String,
    header: Option<String>,
    footer: Option<String>,
    #[serde(default = "default_query")]
    query: String,
    logo: Option<String>,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            title: String::new(),
            header: None,
            footer: None,
            query: default_query(),
            logo: None,
        }
    }
}

fn default_query() -> String {
    REPORT_QUERY.to_string()
}

#[derive(Debug, Deserialize)]
struct EmbeddedSource {
    driver: String,
    url: String,
    user: Option<String>,
    password: Option<String>,
    #[serde(default)]
    queries: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<toml::Value>>,
}

fn inline_cell(value: toml::Value) -> CellValue {
    match value {
        toml::Value::Integer(i) => CellValue::Integer(i),
        toml::Value::Float(x) => CellValue::Real(x),
        toml::Value::String(s) => CellValue::Text(s),
        other => CellValue::Text(other.to_string()),
    }
}

/// A parsed report template.
#[derive(Debug)]
pub struct Template {
    source: PathBuf,
    title: String,
    header: Option<String>,
    footer: Option<String>,
    query: String,
    logo: Option<String>,
    columns: Vec<Column>,
    parameters: ParameterTable,
    configuration: ReportConfiguration,
    resources: ResourceManager,
    data_factory: Option<Box<dyn DataFactory>>,
}

impl Template {
    /// Read and parse the template file at `path`.
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::TemplateIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &text)
    }

    /// Parse template text. `source` locates relative resources and databases.
    pub fn parse(source: &Path, text: &str) -> Result<Self, EngineError> {
        let parse_err = |reason: String| EngineError::TemplateParse {
            path: source.to_path_buf(),
            reason,
        };
        let doc: TemplateDocument = toml::from_str(text).map_err(|e| parse_err(e.to_string()))?;

        doc.page.validate().map_err(parse_err)?;
        for column in &doc.columns {
            if column.field.trim().is_empty() {
                return Err(parse_err("column with empty field".to_string()));
            }
            if !(column.width > 0.0) {
                return Err(parse_err(format!(
                    "column '{}' must have a positive width",
                    column.field
                )));
            }
        }

        let resources = ResourceManager::for_template(source);
        let data_factory: Option<Box<dyn DataFactory>> = match (doc.data_source, doc.data) {
            (Some(_), Some(_)) => {
                return Err(parse_err(
                    "declare either [data_source] or [data], not both".to_string(),
                ))
            }
            (Some(embedded), None) => {
                let mut connection = ConnectionInfo::new(embedded.driver, embedded.url)
                    .with_credentials(embedded.user, embedded.password);
                if let Some(base) = resources.base_dir() {
                    connection = connection.resolve_relative(base);
                }
                let sql_source = embedded
                    .queries
                    .into_iter()
                    .fold(SqlDataSource::new(connection), |acc, (name, sql)| {
                        acc.with_query(name, sql)
                    });
                Some(Box::new(sql_source))
            }
            (None, Some(inline)) => {
                let width = inline.columns.len();
                let mut table = ResultTable::new(inline.columns);
                for (i, row) in inline.rows.into_iter().enumerate() {
                    if row.len() != width {
                        return Err(parse_err(format!(
                            "data row {} has {} values, expected {}",
                            i + 1,
                            row.len(),
                            width
                        )));
                    }
                    table.rows.push(row.into_iter().map(inline_cell).collect());
                }
                Some(Box::new(TableDataFactory::new(table)))
            }
            (None, None) => None,
        };

        Ok(Self {
            source: source.to_path_buf(),
            title: doc.report.title,
            header: doc.report.header,
            footer: doc.report.footer,
            query: doc.report.query,
            logo: doc.report.logo,
            columns: doc.columns,
            parameters: doc.parameters,
            configuration: doc.page,
            resources,
            data_factory,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Name of the query the report reads its rows from.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, name: impl Into<String>) {
        self.query = name.into();
    }

    pub fn parameter_values(&self) -> &ParameterTable {
        &self.parameters
    }

    pub fn configuration(&self) -> &ReportConfiguration {
        &self.configuration
    }

    pub fn resource_manager(&self) -> &ResourceManager {
        &self.resources
    }

    pub fn data_factory(&self) -> Option<&dyn DataFactory> {
        self.data_factory.as_deref()
    }

    /// Replace the data factory declared by the template.
    pub fn set_data_factory(&mut self, factory: Box<dyn DataFactory>) {
        self.data_factory = Some(factory);
    }

    /// Expand `${name}` expressions from the parameter table. Unknown names expand to nothing.
    pub fn expand(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = after[..end].trim();
                    if let Some(value) = self.parameters.get(name) {
                        out.push_str(&value.to_string());
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Run the report query. Without a data factory the result is empty.
    pub fn fetch(&self) -> Result<ResultTable, EngineError> {
        match &self.data_factory {
            Some(factory) => factory.query_data(&self.query, &self.parameters),
            None => Ok(ResultTable::new(
                self.columns.iter().map(|c| c.field.clone()).collect(),
            )),
        }
    }

    /// Bind the template's columns to `table`. No declared columns means all of them.
    pub fn bind_columns(&self, table: &ResultTable) -> Result<Vec<BoundColumn>, EngineError> {
        let bound: Vec<(String, usize, f64, bool)> = if self.columns.is_empty() {
            table
                .columns
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i, 1.0, false))
                .collect()
        } else {
            self.columns
                .iter()
                .map(|column| {
                    table
                        .column_index(&column.field)
                        .map(|i| (column.header().to_string(), i, column.width, column.link))
                        .ok_or_else(|| EngineError::UnknownField(column.field.clone()))
                })
                .collect::<Result<_, _>>()?
        };

        let total: f64 = bound.iter().map(|(_, _, w, _)| w).sum();
        Ok(bound
            .into_iter()
            .map(|(header, index, width, link)| BoundColumn {
                header,
                index,
                width: if total > 0.0 { width / total } else { 0.0 },
                link,
            })
            .collect())
    }

    /// Fetch rows and expand text: the input for every output processor.
    pub fn content(&self) -> Result<ReportContent, EngineError> {
        let table = self.fetch()?;
        let columns = self.bind_columns(&table)?;
        Ok(ReportContent {
            title: self.expand(&self.title),
            header: self.header.as_deref().map(|h| self.expand(h)),
            footer: self.footer.as_deref().map(|f| self.expand(f)),
            logo: self.logo.as_deref().map(|l| self.resources.resolve(l)),
            columns,
            table,
        })
    }

    /// Bind a parameter value, overwriting any existing one.
    pub fn set_parameter(&mut self, key: impl Into<String>, value: ParameterValue) {
        self.parameters.insert(key.into(), value);
    }
}
