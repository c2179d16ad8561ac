//! Report generation module.
//!
//! Builds the [`CleaningReport`](crate::types::CleaningReport) for a run and
//! renders it as Markdown or JSON.
//!
//! # Example
//!
//! ```rust,ignore
//! use survey_cleaning::reporting::{ReportFormat, ReportGenerator, render_markdown};
//!
//! println!("{}", render_markdown(&outcome.report));
//!
//! // Writes output/responses-cleaning-report.json
//! ReportGenerator::write_report(&outcome.report, "output", "responses", ReportFormat::Json)?;
//! ```

mod generator;
mod markdown;

pub use generator::{ReportFormat, ReportGenerator, ReportParams};
pub use markdown::render_markdown;
