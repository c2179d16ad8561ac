//! Pipeline module.
//!
//! This module provides the cleaning orchestrator and its remediation steps.

mod builder;
mod executor;
mod outliers;
pub mod progress;

pub use builder::{AutoCleaner, AutoCleanerBuilder, DetectionPass};
pub use progress::{CleaningStage, ClosureProgressReporter, ProgressReporter, ProgressUpdate};
