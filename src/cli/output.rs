//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ReportError;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &ReportError) -> String {
    format!("Error: {}", e)
}
