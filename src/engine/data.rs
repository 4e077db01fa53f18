//! Data factories and result tables.

use crate::error::EngineError;
use crate::params::{ParameterTable, ParameterValue};
use std::fmt;

/// A single value in a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl CellValue {
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Real(_))
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Real(x) => write!(f, "{}", x),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Blob(bytes) => write!(f, "[{} bytes]", bytes.len()),
        }
    }
}

impl From<rusqlite::types::Value> for CellValue {
    fn from(value: rusqlite::types::Value) -> Self {
        use rusqlite::types::Value;
        match value {
            Value::Null => CellValue::Null,
            Value::Integer(i) => CellValue::Integer(i),
            Value::Real(x) => CellValue::Real(x),
            Value::Text(s) => CellValue::Text(s),
            Value::Blob(b) => CellValue::Blob(b),
        }
    }
}

impl From<&ParameterValue> for CellValue {
    fn from(value: &ParameterValue) -> Self {
        match value {
            ParameterValue::Bool(b) => CellValue::Text(b.to_string()),
            ParameterValue::Integer(i) => CellValue::Integer(*i),
            ParameterValue::Float(x) => CellValue::Real(*x),
            ParameterValue::Text(s) => CellValue::Text(s.clone()),
        }
    }
}

/// Rows returned by a data factory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ResultTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Position of `field` among the columns (exact match first, then ASCII case-insensitive).
    pub fn column_index(&self, field: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c == field)
            .or_else(|| self.columns.iter().position(|c| c.eq_ignore_ascii_case(field)))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Source of report rows.
///
/// A template carries at most one data factory: either the one declared in the
/// template file or one supplied by the caller in its place.
pub trait DataFactory: fmt::Debug + Send + Sync {
    /// Names of the queries this factory can run.
    fn query_names(&self) -> Vec<String>;

    /// Text of the named query, when the factory is query based.
    fn query_text(&self, name: &str) -> Option<&str>;

    /// Run the named query with the template's parameter table.
    fn query_data(&self, name: &str, parameters: &ParameterTable)
        -> Result<ResultTable, EngineError>;
}

/// Inline rows declared in the template; answers every query name.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDataFactory {
    table: ResultTable,
}

impl TableDataFactory {
    pub fn new(table: ResultTable) -> Self {
        Self { table }
    }
}

impl DataFactory for TableDataFactory {
    fn query_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn query_text(&self, _name: &str) -> Option<&str> {
        None
    }

    fn query_data(
        &self,
        _name: &str,
        _parameters: &ParameterTable,
    ) -> Result<ResultTable, EngineError> {
        Ok(self.table.clone())
    }
}
