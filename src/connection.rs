//! Connection info and the SQL data source descriptor
//!
//! The generator turns the service's `connection-*` settings into a
//! [`ConnectionInfo`], and pairs it with the loaded query text in a
//! [`SqlDataSource`]. The render engine runs that query when it lays out the
//! report.

use crate::engine::data::{CellValue, DataFactory, ResultTable};
use crate::error::EngineError;
use crate::params::{ParameterTable, ParameterValue};
use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Name of the query the generator binds its SQL to.
pub const REPORT_QUERY: &str = "ReportQuery";

/// Supported database drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Sqlite,
}

impl FromStr for Driver {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" | "org.sqlite.jdbc" => Ok(Driver::Sqlite),
            _ => Err(EngineError::UnsupportedDriver(s.to_string())),
        }
    }
}

/// Where a SQLite URL points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

/// Database driver, URL and credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub driver: String,
    pub url: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl fmt::Debug for ConnectionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionInfo")
            .field("driver", &self.driver)
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "****"))
            .finish()
    }
}

impl ConnectionInfo {
    pub fn new(driver: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            driver: driver.into(),
            url: url.into(),
            user: None,
            password: None,
        }
    }

    pub fn with_credentials(mut self, user: Option<String>, password: Option<String>) -> Self {
        self.user = user;
        self.password = password;
        self
    }

    /// One-line description with the password masked.
    pub fn summary(&self) -> String {
        format!(
            "[{}][{}][{}][****]",
            self.driver,
            self.url,
            self.user.as_deref().unwrap_or("")
        )
    }

    pub fn driver_kind(&self) -> Result<Driver, EngineError> {
        self.driver.parse()
    }

    /// Database the URL refers to.
    pub fn target(&self) -> DatabaseTarget {
        let url = self.url.trim();
        let rest = ["jdbc:sqlite:", "sqlite://", "sqlite:"]
            .iter()
            .find_map(|prefix| url.strip_prefix(prefix))
            .unwrap_or(url);
        if rest.is_empty() || rest == ":memory:" {
            DatabaseTarget::Memory
        } else {
            DatabaseTarget::File(PathBuf::from(rest))
        }
    }

    /// Rebase a relative database path onto `base`.
    pub fn resolve_relative(mut self, base: &Path) -> Self {
        if let DatabaseTarget::File(path) = self.target() {
            if path.is_relative() {
                self.url = base.join(path).display().to_string();
            }
        }
        self
    }

    /// Open a connection. File databases are opened read-only.
    pub fn open(&self) -> Result<Connection, EngineError> {
        match self.driver_kind()? {
            Driver::Sqlite => {}
        }
        if self.user.is_some() || self.password.is_some() {
            debug!(driver = %self.driver, "Credentials are not used by the sqlite driver");
        }
        let conn = match self.target() {
            DatabaseTarget::Memory => Connection::open_in_memory(),
            DatabaseTarget::File(path) => Connection::open_with_flags(
                &path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            ),
        };
        conn.map_err(|e| EngineError::Connection(format!("{}: {}", self.url, e)))
    }
}

fn to_sql_value(value: &ParameterValue) -> Value {
    match value {
        ParameterValue::Bool(b) => Value::Integer(i64::from(*b)),
        ParameterValue::Integer(i) => Value::Integer(*i),
        ParameterValue::Float(x) => Value::Real(*x),
        ParameterValue::Text(s) => Value::Text(s.clone()),
    }
}

/// SQL data source descriptor: a connection plus named queries.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlDataSource {
    connection: ConnectionInfo,
    queries: BTreeMap<String, String>,
}

impl SqlDataSource {
    pub fn new(connection: ConnectionInfo) -> Self {
        Self {
            connection,
            queries: BTreeMap::new(),
        }
    }

    /// Descriptor bound to a single query named [`REPORT_QUERY`].
    pub fn single(connection: ConnectionInfo, sql: impl Into<String>) -> Self {
        Self::new(connection).with_query(REPORT_QUERY, sql)
    }

    pub fn with_query(mut self, name: impl Into<String>, sql: impl Into<String>) -> Self {
        self.queries.insert(name.into(), sql.into());
        self
    }
}

impl DataFactory for SqlDataSource {
    fn query_names(&self) -> Vec<String> {
        self.queries.keys().cloned().collect()
    }

    fn query_text(&self, name: &str) -> Option<&str> {
        self.queries.get(name).map(String::as_str)
    }

    fn query_data(
        &self,
        name: &str,
        parameters: &ParameterTable,
    ) -> Result<ResultTable, EngineError> {
        let query_err = |e: rusqlite::Error| EngineError::Query {
            name: name.to_string(),
            reason: e.to_string(),
        };
        let sql = self.query_text(name).ok_or_else(|| EngineError::Query {
            name: name.to_string(),
            reason: "query is not defined".to_string(),
        })?;

        let conn = self.connection.open()?;
        let mut stmt = conn.prepare(sql).map_err(query_err)?;

        // Named parameters (:name, @name, $name) come from the parameter table.
        for index in 1..=stmt.parameter_count() {
            let value = stmt
                .parameter_name(index)
                .map(|raw| raw.trim_start_matches([':', '@', '$']))
                .and_then(|key| parameters.get(key))
                .map(to_sql_value)
                .unwrap_or(Value::Null);
            stmt.raw_bind_parameter(index, value).map_err(query_err)?;
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();
        let mut table = ResultTable::new(columns);

        let mut rows = stmt.raw_query();
        while let Some(row) = rows.next().map_err(query_err)? {
            let mut cells = Vec::with_capacity(width);
            for index in 0..width {
                let value: Value = row.get(index).map_err(query_err)?;
                cells.push(CellValue::from(value));
            }
            table.rows.push(cells);
        }

        debug!(query = name, rows = table.len(), "Query executed");
        Ok(table)
    }
}
