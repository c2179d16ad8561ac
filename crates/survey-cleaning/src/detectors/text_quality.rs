//! Gibberish detection in free-text answers.

use crate::config::TextQualitySettings;
use crate::dataset::{ColumnType, Dataset};
use crate::error::Result;
use crate::heuristics::NameHeuristics;
use crate::types::{TextIssue, TextProblem};

/// Sequential-key runs typical of keyboard mashing.
const MASHING_SEQUENCES: [&str; 6] = ["asdf", "qwer", "zxcv", "hjkl", "uiop", "1234"];

const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

/// Consonant-to-vowel ratio above which a value looks unnatural.
const MAX_CONSONANT_RATIO: f64 = 5.0;

pub struct TextQualityDetector;

impl TextQualityDetector {
    pub fn detect(dataset: &Dataset, settings: &TextQualitySettings) -> Result<Vec<TextIssue>> {
        Self::detect_with(dataset, settings, &NameHeuristics::default())
    }

    /// Check every non-blank value of every text column.
    ///
    /// Columns matching `heuristics.respondent_id` are skipped only when
    /// `skip_identifier_columns` is set.
    pub fn detect_with(
        dataset: &Dataset,
        settings: &TextQualitySettings,
        heuristics: &NameHeuristics,
    ) -> Result<Vec<TextIssue>> {
        if !settings.enabled || !settings.detect_gibberish {
            return Ok(Vec::new());
        }

        let mut issues = Vec::new();
        for column in dataset
            .columns_of_type(ColumnType::Text)
            .filter(|c| {
                !(settings.skip_identifier_columns && (heuristics.respondent_id)(&c.name))
            })
        {
            for (row_index, row) in dataset.rows().iter().enumerate() {
                let cell = row.get(&column.name);
                if cell.is_blank() {
                    continue;
                }
                let value = cell.to_string();
                let problems = Self::problems(&value, settings);
                if !problems.is_empty() {
                    issues.push(TextIssue {
                        row_index,
                        column: column.name.clone(),
                        value,
                        problems,
                    });
                }
            }
        }
        Ok(issues)
    }

    /// Every problem found in `value`, evaluated on its trimmed form.
    pub fn problems(value: &str, settings: &TextQualitySettings) -> Vec<TextProblem> {
        let trimmed = value.trim();
        let lower = trimmed.to_lowercase();
        let length = trimmed.chars().count();
        let mut problems = Vec::new();

        if length < settings.minimum_length {
            problems.push(TextProblem::TooShort);
        }

        if longest_run(&lower) > settings.maximum_repeated_chars {
            problems.push(TextProblem::RepeatedChars);
        }

        if length > 3 {
            let mut chars = lower.chars();
            if let Some(first) = chars.next()
                && chars.all(|c| c == first)
            {
                problems.push(TextProblem::SingleCharRepeated);
            }
        }

        if MASHING_SEQUENCES.iter().any(|seq| lower.contains(seq)) {
            problems.push(TextProblem::KeyboardMashing);
        }

        let vowels = lower.chars().filter(|c| VOWELS.contains(c)).count();
        let consonants = lower
            .chars()
            .filter(|c| c.is_ascii_alphabetic() && !VOWELS.contains(c))
            .count();

        if length > 3 && vowels == 0 {
            problems.push(TextProblem::NoVowels);
        }

        if vowels > 0 && consonants as f64 / vowels as f64 > MAX_CONSONANT_RATIO {
            problems.push(TextProblem::UnusualConsonantRatio);
        }

        problems
    }
}

fn longest_run(value: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;
    for c in value.chars() {
        if Some(c) == previous {
            current += 1;
        } else {
            current = 1;
            previous = Some(c);
        }
        longest = longest.max(current);
    }
    longest
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Column;
    use crate::detectors::test_support::dataset;

    fn problems(value: &str) -> Vec<TextProblem> {
        TextQualityDetector::problems(value, &TextQualitySettings::default())
    }

    #[test]
    fn test_repeated_single_vowel() {
        let found = problems("aaaaaa");
        assert!(found.contains(&TextProblem::RepeatedChars));
        assert!(found.contains(&TextProblem::SingleCharRepeated));
        assert!(!found.contains(&TextProblem::NoVowels));
    }

    #[test]
    fn test_no_vowels() {
        assert!(problems("bcdfg").contains(&TextProblem::NoVowels));
        assert!(!problems("bcd").contains(&TextProblem::NoVowels));
    }

    #[test]
    fn test_repeated_chars_case_insensitive() {
        assert!(problems("greAAAat").contains(&TextProblem::RepeatedChars));
        assert!(!problems("greaaat").contains(&TextProblem::RepeatedChars));
    }

    #[test]
    fn test_keyboard_mashing_and_short() {
        assert!(problems("ASDFghjk").contains(&TextProblem::KeyboardMashing));
        assert_eq!(problems(" x "), vec![TextProblem::TooShort]);
    }

    #[test]
    fn test_consonant_ratio() {
        assert!(problems("strngths a").contains(&TextProblem::UnusualConsonantRatio));
        assert!(!problems("orange juice").contains(&TextProblem::UnusualConsonantRatio));
    }

    #[test]
    fn test_clean_text_has_no_problems() {
        assert!(problems("The checkout process was confusing").is_empty());
    }

    #[test]
    fn test_detect_only_text_columns() {
        let data = dataset(
            vec![Column::text("Comments"), Column::categorical("Segment")],
            &[
                vec!["Great service overall", "bcdfg"],
                vec!["qwerty", "A"],
                vec!["   ", "B"],
            ],
        );
        let issues = TextQualityDetector::detect(&data, &TextQualitySettings::default()).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].row_index, 1);
        assert_eq!(issues[0].problems, vec![TextProblem::KeyboardMashing]);
    }

    #[test]
    fn test_respondent_id_column_checked_by_default() {
        let data = dataset(
            vec![Column::text("ResponseID"), Column::text("Comments")],
            &[vec!["bcdfgh", "Fine"], vec!["R002", "bcdfg"]],
        );
        let issues = TextQualityDetector::detect(&data, &TextQualitySettings::default()).unwrap();
        let found: Vec<(usize, &str)> = issues
            .iter()
            .map(|i| (i.row_index, i.column.as_str()))
            .collect();
        assert_eq!(found, vec![(0, "ResponseID"), (1, "ResponseID"), (1, "Comments")]);
        assert!(issues[0].problems.contains(&TextProblem::NoVowels));
    }

    #[test]
    fn test_identifier_columns_skipped_when_configured() {
        let data = dataset(
            vec![Column::text("ResponseID"), Column::text("Comments")],
            &[vec!["bcdfgh", "Fine"], vec!["R002", "bcdfg"]],
        );
        let settings = TextQualitySettings {
            skip_identifier_columns: true,
            ..Default::default()
        };
        let issues = TextQualityDetector::detect(&data, &settings).unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].column, "Comments");
    }

    #[test]
    fn test_gibberish_detection_disabled() {
        let data = dataset(vec![Column::text("Comments")], &[vec!["zzzzzz"]]);
        let settings = TextQualitySettings {
            detect_gibberish: false,
            ..Default::default()
        };
        assert!(TextQualityDetector::detect(&data, &settings).unwrap().is_empty());
    }
}
