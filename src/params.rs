//! Report parameters
//!
//! Callers hand the pipeline a single [`ParameterSet`]. Keys carrying the
//! `SQL_` prefix (any ASCII case) are query parameters and are spliced into the
//! SQL text; every other key is a report parameter bound into the template.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Prefix marking a query-substitution parameter.
pub const QUERY_PARAMETER_PREFIX: &str = "SQL_";

/// A typed parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl ParameterValue {
    /// Parse a command-line literal: bool, then integer, then float, else text.
    pub fn parse_literal(raw: &str) -> Self {
        if let Ok(b) = raw.parse::<bool>() {
            return ParameterValue::Bool(b);
        }
        if let Ok(i) = raw.parse::<i64>() {
            return ParameterValue::Integer(i);
        }
        if let Ok(f) = raw.parse::<f64>() {
            if f.is_finite() {
                return ParameterValue::Float(f);
            }
        }
        ParameterValue::Text(raw.to_string())
    }
}

impl fmt::Display for ParameterValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterValue::Bool(b) => write!(f, "{}", b),
            ParameterValue::Integer(i) => write!(f, "{}", i),
            ParameterValue::Float(x) => write!(f, "{}", x),
            ParameterValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Text(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Float(value)
    }
}

impl From<bool> for ParameterValue {
    fn from(value: bool) -> Self {
        ParameterValue::Bool(value)
    }
}

/// Parameter table of a template (report parameters).
pub type ParameterTable = BTreeMap<String, ParameterValue>;

/// A query parameter with its prefix stripped.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryParameter {
    /// Key as supplied by the caller, e.g. `SQL_DATE`
    pub key: String,
    /// Key without the prefix, e.g. `DATE`
    pub name: String,
    pub value: ParameterValue,
}

/// Whether `key` names a query parameter.
pub fn is_query_parameter(key: &str) -> bool {
    key.get(..QUERY_PARAMETER_PREFIX.len())
        .map(|head| head.eq_ignore_ascii_case(QUERY_PARAMETER_PREFIX))
        .unwrap_or(false)
}

/// Caller-supplied parameters for one generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    values: HashMap<String, ParameterValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParameterValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParameterValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ParameterValue)> {
        self.values.iter()
    }

    /// Parameters bound into the template's parameter table.
    pub fn report_parameters(&self) -> ParameterTable {
        self.values
            .iter()
            .filter(|(key, _)| !is_query_parameter(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Parameters substituted into the query text, sorted by key.
    pub fn query_parameters(&self) -> Vec<QueryParameter> {
        let mut params: Vec<QueryParameter> = self
            .values
            .iter()
            .filter(|(key, _)| is_query_parameter(key))
            .map(|(key, value)| QueryParameter {
                key: key.clone(),
                name: key[QUERY_PARAMETER_PREFIX.len()..].to_string(),
                value: value.clone(),
            })
            .collect();
        params.sort_by(|a, b| a.key.cmp(&b.key));
        params
    }

    /// Split into (report parameters, query parameters).
    pub fn partition(&self) -> (ParameterTable, Vec<QueryParameter>) {
        (self.report_parameters(), self.query_parameters())
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<ParameterValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = ParameterSet::new();
        for (key, value) in iter {
            set.insert(key, value);
        }
        set
    }
}
