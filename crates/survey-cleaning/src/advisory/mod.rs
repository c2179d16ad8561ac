//! Advisory module for externally recommended cleaning settings.
//!
//! An advisor looks at a compact [`DatasetOverview`] and proposes a
//! [`SettingsRecommendation`]. [`crate::AutoCleaner::run_with_advisor`] applies
//! it on top of the caller's settings, and falls back to those settings if
//! the advisor fails.
//!
//! # Feature Flag
//!
//! The [`CleaningAdvisor`] trait is always available. The HTTP client
//! ([`HttpAdvisor`]) requires the `advisory` feature (enabled by default).
//!
//! ```toml
//! # Disable the HTTP advisor for a smaller binary
//! survey-cleaning = { version = "0.1", default-features = false }
//! ```

mod provider;
pub use provider::{CleaningAdvisor, ColumnOverview, DatasetOverview, SettingsRecommendation};

#[cfg(feature = "advisory")]
mod http;

#[cfg(feature = "advisory")]
pub use http::{HttpAdvisor, HttpAdvisorConfig, HttpAdvisorConfigBuilder};
