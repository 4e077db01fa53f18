//! reportkit: Template-Driven Report Generation
//!
//! Loads report templates, feeds them rows from a SQL data source, injects
//! runtime parameters, and renders PDF, HTML or spreadsheet output. The
//! [`service::ReportService`] hands out configured generators by report name.

pub mod cli;
pub mod config;
pub mod connection;
pub mod engine;
pub mod error;
pub mod generator;
pub mod logging;
pub mod params;
pub mod query;
pub mod registry;
pub mod service;

pub use engine::{OutputFormat, RenderEngine};
pub use error::{EngineError, ReportError};
pub use generator::{GeneratorSettings, ReportGenerator};
pub use params::{ParameterSet, ParameterValue};
pub use service::ReportService;
