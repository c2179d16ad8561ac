//! Value-level cleaning used by the remediation steps.
//!
//! This module provides:
//! - Text normalization (whitespace, URLs, special characters)

mod sanitizers;

pub use sanitizers::TextSanitizer;
