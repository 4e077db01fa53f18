//! Integration tests for the reportkit report pipeline and service

mod cli_commands;
mod config_integration;
mod output_formats;
mod pipeline_scenarios;
mod service_lifecycle;
mod test_utils;
