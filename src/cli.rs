//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; a single route table dispatches to the report service.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{parse_param, Cli, Commands};
pub use presentation::{
    format_report_list_json, format_report_list_text, format_validation_json,
    format_validation_text, ValidationReport,
};
pub use route::RunContext;
