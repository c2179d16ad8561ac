//! Column-name heuristics.
//!
//! Each heuristic is a plain predicate over a column name. Detectors receive
//! them through [`NameHeuristics`], so the matching rules can be swapped
//! without touching detection logic.

/// A predicate deciding whether a column name matches a heuristic.
pub type NamePredicate = fn(&str) -> bool;

/// The set of name predicates used by the detectors.
#[derive(Debug, Clone, Copy)]
pub struct NameHeuristics {
    pub respondent_id: NamePredicate,
    pub duration: NamePredicate,
    pub timestamp: NamePredicate,
    pub likert: NamePredicate,
}

impl Default for NameHeuristics {
    fn default() -> Self {
        Self {
            respondent_id: is_respondent_id,
            duration: is_duration,
            timestamp: is_timestamp,
            likert: is_likert,
        }
    }
}

/// Lowercase and keep only alphanumerics, so "Response ID" and "response_id" compare equal.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Names like "ResponseID", "Respondent Id" or "response_id".
pub fn is_respondent_id(name: &str) -> bool {
    let normalized = normalize(name);
    normalized.contains("respondentid") || normalized.contains("responseid")
}

/// Contains "duration", or "time" without "start".
pub fn is_duration(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("duration") || (lower.contains("time") && !lower.contains("start"))
}

pub fn is_timestamp(name: &str) -> bool {
    let lower = name.to_lowercase();
    ["timestamp", "date", "time"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// Names suggesting a rating or agreement scale.
pub fn is_likert(name: &str) -> bool {
    const MARKERS: [&str; 7] = [
        "likert", "rating", "agree", "satisf", "likel", "quality", "scale",
    ];
    let lower = name.to_lowercase();
    MARKERS.iter().any(|marker| lower.contains(marker))
}
