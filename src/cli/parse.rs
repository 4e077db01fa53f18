//! CLI parse: clap types for reportkit. No behavior; definitions only.

use crate::engine::OutputFormat;
use crate::params::{is_query_parameter, ParameterValue};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// reportkit CLI - template-driven report generation
#[derive(Parser)]
#[command(name = "reportkit")]
#[command(about = "Render report templates with SQL data to PDF, HTML or spreadsheets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log each pipeline step with a [DEBUG] prefix
    #[arg(long, default_value = "false")]
    pub debug: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a registered report
    Generate {
        /// Report name
        report: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
        format: OutputFormat,
        /// Destination file or directory; "-" or absent writes to stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Report parameter as key=value; SQL_ keys are substituted into the query
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, ParameterValue)>,
    },
    /// List registered reports
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Validate configuration, strategy and templates
    Validate {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

/// Parse a `key=value` parameter.
///
/// Query parameter values (`SQL_` keys) stay text exactly as typed, since they
/// are spliced into the query verbatim. Other values are typed as bool,
/// integer, float, else text.
pub fn parse_param(raw: &str) -> Result<(String, ParameterValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in '{}'", raw));
    }
    let value = if is_query_parameter(key) {
        ParameterValue::Text(value.to_string())
    } else {
        ParameterValue::parse_literal(value)
    };
    Ok((key.to_string(), value))
}
