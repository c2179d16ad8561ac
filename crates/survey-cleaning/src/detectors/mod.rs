//! Detectors for survey data-quality problems.
//!
//! Each detector is a stateless unit struct with a `detect` function taking a
//! read-only [`Dataset`](crate::Dataset) and its settings slice and returning
//! a freshly allocated list of issues:
//! - [`DuplicateDetector`] - repeated respondent ids or near-identical rows
//! - [`SpeederDetector`] - implausibly fast completion times
//! - [`StraightLinerDetector`] - no variance across rating questions
//! - [`OutlierDetector`] - IQR or z-score outliers in number columns
//! - [`MissingDataDetector`] - columns with a high share of missing values
//! - [`TextQualityDetector`] - gibberish in free-text answers
//!
//! Detectors that look columns up by name also have a `detect_with` variant
//! taking custom [`NameHeuristics`](crate::heuristics::NameHeuristics).

mod duplicates;
mod missing;
mod outliers;
mod speeders;
mod straight_liners;
mod text_quality;

pub use duplicates::{DuplicateDetector, merge_duplicate_groups};
pub use missing::MissingDataDetector;
pub use outliers::OutlierDetector;
pub use speeders::SpeederDetector;
pub use straight_liners::StraightLinerDetector;
pub use text_quality::TextQualityDetector;

// Detectors may be run from parallel tasks
static_assertions::assert_impl_all!(DuplicateDetector: Send, Sync);
static_assertions::assert_impl_all!(SpeederDetector: Send, Sync);
static_assertions::assert_impl_all!(StraightLinerDetector: Send, Sync);
static_assertions::assert_impl_all!(OutlierDetector: Send, Sync);
static_assertions::assert_impl_all!(MissingDataDetector: Send, Sync);
static_assertions::assert_impl_all!(TextQualityDetector: Send, Sync);
