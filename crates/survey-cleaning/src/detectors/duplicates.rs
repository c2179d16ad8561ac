//! Duplicate response detection.
//!
//! Two strategies, tried in order:
//! 1. Respondent id: rows sharing an id value. Used exclusively when it finds anything.
//! 2. Field similarity: every pair of rows compared across the non-date,
//!    non-timestamp columns. Bounded by `maxPairwiseRows`.

use crate::config::DuplicateSettings;
use crate::dataset::{ColumnType, Dataset};
use crate::error::Result;
use crate::heuristics::NameHeuristics;
use crate::types::DuplicateIssue;
use std::collections::HashMap;
use tracing::{debug, warn};

pub struct DuplicateDetector;

impl DuplicateDetector {
    pub fn detect(dataset: &Dataset, settings: &DuplicateSettings) -> Result<Vec<DuplicateIssue>> {
        Self::detect_with(dataset, settings, &NameHeuristics::default())
    }

    pub fn detect_with(
        dataset: &Dataset,
        settings: &DuplicateSettings,
        heuristics: &NameHeuristics,
    ) -> Result<Vec<DuplicateIssue>> {
        if !settings.enabled || dataset.is_empty() {
            return Ok(Vec::new());
        }

        if settings.compare_by_respondent_id
            && let Some(id_column) = dataset
                .columns()
                .iter()
                .find(|c| (heuristics.respondent_id)(&c.name))
        {
            let issues = Self::by_respondent_id(dataset, &id_column.name);
            if !issues.is_empty() {
                debug!(
                    "Found {} duplicate ids in column '{}'",
                    issues.len(),
                    id_column.name
                );
                return Ok(issues);
            }
        }

        if Self::exceeds_pairwise_limit(dataset, settings) {
            warn!(
                "Skipping pairwise duplicate check: {} rows exceeds limit of {}",
                dataset.row_count(),
                settings.max_pairwise_rows
            );
            return Ok(Vec::new());
        }

        let issues = Self::by_similarity(dataset, settings.similarity_threshold, heuristics);
        debug!("Found {} near-duplicate row pairs", issues.len());
        Ok(issues)
    }

    /// Whether the similarity pass would be skipped for this dataset.
    pub fn exceeds_pairwise_limit(dataset: &Dataset, settings: &DuplicateSettings) -> bool {
        dataset.row_count() > settings.max_pairwise_rows
    }

    fn by_respondent_id(dataset: &Dataset, column: &str) -> Vec<DuplicateIssue> {
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut issues = Vec::new();

        for (index, row) in dataset.rows().iter().enumerate() {
            let cell = row.get(column);
            if !cell.has_content() {
                continue;
            }
            let id = cell.to_string().trim().to_string();
            match first_seen.get(&id) {
                Some(&first) => issues.push(DuplicateIssue {
                    group_id: format!("respondent-{}", id),
                    row_indices: vec![first, index],
                    similarity: 1.0,
                }),
                None => {
                    first_seen.insert(id, index);
                }
            }
        }

        issues
    }

    fn by_similarity(
        dataset: &Dataset,
        threshold: f64,
        heuristics: &NameHeuristics,
    ) -> Vec<DuplicateIssue> {
        let columns: Vec<&str> = dataset
            .columns()
            .iter()
            .filter(|c| c.column_type != ColumnType::Date && !(heuristics.timestamp)(&c.name))
            .map(|c| c.name.as_str())
            .collect();

        // One normalized key per comparison cell, None when the cell has no content.
        let keys: Vec<Vec<Option<String>>> = dataset
            .rows()
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|column| {
                        let cell = row.get(column);
                        cell.has_content().then(|| cell.to_string().trim().to_string())
                    })
                    .collect()
            })
            .collect();

        let mut issues = Vec::new();
        for i in 0..keys.len() {
            for j in (i + 1)..keys.len() {
                let similarity = row_similarity(&keys[i], &keys[j]);
                if similarity >= threshold && similarity > 0.0 {
                    issues.push(DuplicateIssue {
                        group_id: format!("similar-{}", issues.len() + 1),
                        row_indices: vec![i, j],
                        similarity,
                    });
                }
            }
        }
        issues
    }
}

/// Matching fields over fields where both sides have content; 0 when there are none.
fn row_similarity(a: &[Option<String>], b: &[Option<String>]) -> f64 {
    let mut compared = 0usize;
    let mut matching = 0usize;
    for (left, right) in a.iter().zip(b) {
        if let (Some(left), Some(right)) = (left, right) {
            compared += 1;
            if left == right {
                matching += 1;
            }
        }
    }
    if compared == 0 {
        0.0
    } else {
        matching as f64 / compared as f64
    }
}

/// Merge issues sharing a group id into one group.
///
/// Row indices are unioned and sorted; similarity is the group minimum.
/// Groups keep the order in which their id first appeared.
pub fn merge_duplicate_groups(issues: &[DuplicateIssue]) -> Vec<DuplicateIssue> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut merged: Vec<DuplicateIssue> = Vec::new();

    for issue in issues {
        match positions.get(issue.group_id.as_str()) {
            Some(&position) => {
                let group = &mut merged[position];
                group.row_indices.extend(issue.row_indices.iter().copied());
                group.similarity = group.similarity.min(issue.similarity);
            }
            None => {
                positions.insert(issue.group_id.as_str(), merged.len());
                merged.push(issue.clone());
            }
        }
    }

    for group in &mut merged {
        group.row_indices.sort_unstable();
        group.row_indices.dedup();
    }
    merged
}
