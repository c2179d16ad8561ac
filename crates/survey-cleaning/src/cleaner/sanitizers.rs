//! Text normalization for free-text answers.

use crate::config::TextQualitySettings;
use crate::dataset::CellValue;
use once_cell::sync::Lazy;
use regex::Regex;

static URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:https?://|www\.)\S+").expect("Invalid regex: url")
});

/// Anything that is not a word character, whitespace or basic punctuation.
static SPECIAL_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s.,!?'\-]").expect("Invalid regex: special chars"));

static WHITESPACE_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace"));

/// Applies the configured text clean-ups to a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSanitizer {
    pub trim_whitespace: bool,
    pub remove_urls: bool,
    pub remove_special_chars: bool,
}

impl TextSanitizer {
    pub fn from_settings(settings: &TextQualitySettings) -> Self {
        Self {
            trim_whitespace: settings.trim_whitespace,
            remove_urls: settings.remove_urls,
            remove_special_chars: settings.remove_special_chars,
        }
    }

    /// Whether any clean-up is switched on.
    pub fn is_active(&self) -> bool {
        self.trim_whitespace || self.remove_urls || self.remove_special_chars
    }

    pub fn clean(&self, value: &str) -> String {
        let mut cleaned = value.to_string();
        if self.remove_urls {
            cleaned = URL_PATTERN.replace_all(&cleaned, "").into_owned();
        }
        if self.remove_special_chars {
            cleaned = SPECIAL_CHARS.replace_all(&cleaned, "").into_owned();
        }
        if self.trim_whitespace {
            cleaned = WHITESPACE_RUNS.replace_all(cleaned.trim(), " ").into_owned();
        }
        cleaned
    }

    /// Clean a text cell. Returns `None` when the cell is unchanged.
    ///
    /// Missing markers pass through untouched so missing-data handling still
    /// sees them. Values that clean down to nothing become [`CellValue::Empty`].
    pub fn clean_cell(&self, cell: &CellValue) -> Option<CellValue> {
        if cell.is_missing() {
            return None;
        }
        let text = cell.as_text()?;
        let cleaned = self.clean(text);
        if cleaned == text {
            return None;
        }
        Some(if cleaned.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(cleaned)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_on() -> TextSanitizer {
        TextSanitizer {
            trim_whitespace: true,
            remove_urls: true,
            remove_special_chars: true,
        }
    }

    #[test]
    fn test_trim_collapses_whitespace() {
        let sanitizer = TextSanitizer::from_settings(&TextQualitySettings::default());
        assert_eq!(sanitizer.clean("  too   many\tspaces "), "too many spaces");
        assert_eq!(sanitizer.clean("ok"), "ok");
    }

    #[test]
    fn test_remove_urls() {
        assert_eq!(
            all_on().clean("see https://example.com/a?b=1 and www.test.org now"),
            "see and now"
        );
    }

    #[test]
    fn test_remove_special_chars() {
        assert_eq!(all_on().clean("Great!!! <3 #love @shop"), "Great!!! 3 love shop");
        assert_eq!(all_on().clean("it's fine, really - ok?"), "it's fine, really - ok?");
    }

    #[test]
    fn test_clean_cell() {
        let sanitizer = all_on();
        assert_eq!(sanitizer.clean_cell(&CellValue::from("fine")), None);
        assert_eq!(
            sanitizer.clean_cell(&CellValue::from(" fine ")),
            Some(CellValue::from("fine"))
        );
        assert_eq!(
            sanitizer.clean_cell(&CellValue::from("  ###  ")),
            Some(CellValue::Empty)
        );
        assert_eq!(sanitizer.clean_cell(&CellValue::Numeric(1.0)), None);
        assert_eq!(sanitizer.clean_cell(&CellValue::Empty), None);
    }

    #[test]
    fn test_missing_markers_untouched() {
        let sanitizer = all_on();
        assert_eq!(sanitizer.clean("N/A"), "NA");
        assert_eq!(sanitizer.clean_cell(&CellValue::from("N/A")), None);
        assert_eq!(sanitizer.clean_cell(&CellValue::from("null")), None);
    }

    #[test]
    fn test_inactive_sanitizer_is_identity() {
        let sanitizer = TextSanitizer {
            trim_whitespace: false,
            remove_urls: false,
            remove_special_chars: false,
        };
        assert!(!sanitizer.is_active());
        assert_eq!(sanitizer.clean("  x  "), "  x  ");
    }
}
