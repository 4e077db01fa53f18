//! Query loading and `@NAME@` substitution
//!
//! Query files are read as raw bytes and decoded explicitly. Substitution is
//! plain text splicing: values are neither quoted nor escaped, so callers are
//! responsible for what they pass in `SQL_` parameters.

use crate::error::ReportError;
use crate::params::QueryParameter;
use std::path::Path;
use tracing::{debug, warn};

/// Read the query file at `path` and decode it.
pub fn load_query(path: &Path) -> Result<String, ReportError> {
    let bytes = std::fs::read(path).map_err(|source| ReportError::QueryNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(query_path = %path.display(), bytes = bytes.len(), "Loaded query file");
    Ok(decode_query(bytes))
}

/// Decode query bytes.
///
/// UTF-8 content is kept as is. Anything else is read as ISO-8859-1, one
/// char per byte, so no byte is lost.
pub fn decode_query(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => err.into_bytes().into_iter().map(char::from).collect(),
    }
}

/// Replace `@KEY@` and `@NAME@` tokens with parameter values.
///
/// Parameters are applied in the order given (sorted by key when they come
/// from [`ParameterSet::query_parameters`](crate::params::ParameterSet::query_parameters)).
pub fn substitute_parameters(sql: &str, params: &[QueryParameter]) -> String {
    let mut result = sql.to_string();
    for param in params {
        if param.name.is_empty() {
            warn!(key = %param.key, "Skipping query parameter with empty name");
            continue;
        }
        let value = param.value.to_string();
        result = result.replace(&format!("@{}@", param.key), &value);
        result = result.replace(&format!("@{}@", param.name), &value);
    }
    result
}

/// Load the query at `path` and apply `params`.
pub fn load_and_substitute(path: &Path, params: &[QueryParameter]) -> Result<String, ReportError> {
    let sql = load_query(path)?;
    Ok(substitute_parameters(&sql, params))
}
