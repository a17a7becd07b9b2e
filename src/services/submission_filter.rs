use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{AssignmentMeta, DifferentiationTag, GradeableRow, SubmissionTag};
use crate::services::submission_state::{derive_tags, format_decimal};

/// Status category of the submission list. Only one is active at a time;
/// section, custom-status, tag and search conditions are ANDed on top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "category", content = "threshold", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionListFilter {
    #[default]
    All,
    Late,
    /// Assignees without any submission object. Rows flagged `missing` that do
    /// have a submission are not part of this category.
    Missing,
    Graded,
    NotGraded,
    Submitted,
    AboveValue(f64),
    BelowValue(f64),
}

impl SubmissionListFilter {
    pub fn matches(&self, row: &GradeableRow, tags: &[SubmissionTag]) -> bool {
        match self {
            Self::All => true,
            Self::Late => tags.contains(&SubmissionTag::Late),
            Self::Missing => tags.contains(&SubmissionTag::NotSubmitted),
            Self::Graded => tags.iter().any(SubmissionTag::is_graded_state),
            Self::NotGraded => {
                tags.iter().any(SubmissionTag::is_pending_state)
                    && !tags.iter().any(SubmissionTag::is_graded_state)
            }
            Self::Submitted => tags.contains(&SubmissionTag::Submitted),
            Self::AboveValue(threshold) => {
                comparable_score(row, tags).is_some_and(|score| score > *threshold)
            }
            Self::BelowValue(threshold) => {
                tags.iter().any(SubmissionTag::is_custom)
                    || comparable_score(row, tags).is_some_and(|score| score < *threshold)
            }
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }
}

/// Numeric score usable by the value filters. Excused and custom-status rows
/// never compare numerically.
fn comparable_score(row: &GradeableRow, tags: &[SubmissionTag]) -> Option<f64> {
    let submission = row.submission.as_ref()?;
    if submission.excused || tags.iter().any(SubmissionTag::is_custom) {
        return None;
    }
    submission.score.filter(|score| score.is_finite())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DifferentiationTagSelection {
    pub tag_ids: BTreeSet<String>,
    pub include_students_without_tags: bool,
}

impl DifferentiationTagSelection {
    pub fn is_active(&self) -> bool {
        !self.tag_ids.is_empty() || self.include_students_without_tags
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterCriteria {
    pub filter: SubmissionListFilter,
    pub selected_section_ids: Vec<i64>,
    pub selected_custom_status_ids: BTreeSet<i64>,
    pub differentiation: DifferentiationTagSelection,
    pub search: String,
    pub search_mode: SearchMode,
}

impl FilterCriteria {
    pub fn with_filter(filter: SubmissionListFilter) -> Self {
        Self { filter, ..Self::default() }
    }
}

pub fn filter<'a>(
    rows: &'a [GradeableRow],
    meta: &AssignmentMeta,
    criteria: &FilterCriteria,
    differentiation_tags: &[DifferentiationTag],
) -> Vec<&'a GradeableRow> {
    rows.iter()
        .filter(|row| {
            let tags = derive_tags(row, meta);
            matches_status(row, &tags, criteria)
                && matches_sections(row, &criteria.selected_section_ids)
                && matches_differentiation_tags(
                    row,
                    differentiation_tags,
                    &criteria.differentiation,
                )
                && matches_search(row, &criteria.search, criteria.search_mode)
        })
        .collect()
}

fn matches_status(row: &GradeableRow, tags: &[SubmissionTag], criteria: &FilterCriteria) -> bool {
    if criteria.selected_custom_status_ids.is_empty() {
        return criteria.filter.matches(row, tags);
    }

    // A custom status selection replaces ALL instead of widening it.
    let matches_category = !criteria.filter.is_all() && criteria.filter.matches(row, tags);
    let matches_custom = row
        .submission
        .as_ref()
        .and_then(|submission| submission.custom_grade_status_id)
        .is_some_and(|id| criteria.selected_custom_status_ids.contains(&id));

    matches_category || matches_custom
}

pub fn matches_sections(row: &GradeableRow, selected_section_ids: &[i64]) -> bool {
    if selected_section_ids.is_empty() {
        return true;
    }

    row.assignee.as_student().is_some_and(|student| {
        student.section_ids.iter().any(|section_id| selected_section_ids.contains(section_id))
    })
}

pub fn matches_differentiation_tags(
    row: &GradeableRow,
    tags: &[DifferentiationTag],
    selection: &DifferentiationTagSelection,
) -> bool {
    if !selection.is_active() {
        return true;
    }

    let Some(student) = row.assignee.as_student() else {
        return false;
    };

    let in_selected_tag = tags
        .iter()
        .any(|tag| selection.tag_ids.contains(&tag.id) && tag.user_ids.contains(&student.id));
    let in_any_tag = tags.iter().any(|tag| tag.user_ids.contains(&student.id));

    match (selection.include_students_without_tags, selection.tag_ids.is_empty()) {
        (true, false) => in_selected_tag || !in_any_tag,
        (true, true) => !in_any_tag,
        (false, _) => in_selected_tag,
    }
}

pub fn matches_search(row: &GradeableRow, query: &str, mode: SearchMode) -> bool {
    if query.is_empty() {
        return true;
    }

    let name = row.assignee.name();
    match mode {
        SearchMode::CaseSensitive => name.contains(query),
        SearchMode::CaseInsensitive => name.to_lowercase().contains(&query.to_lowercase()),
    }
}

/// Title describing the active filter, shown above the list and reused as the
/// subject prefix of bulk messages.
pub fn header_title(criteria: &FilterCriteria, meta: &AssignmentMeta) -> String {
    if !criteria.selected_custom_status_ids.is_empty() {
        if criteria.filter.is_all() && criteria.selected_custom_status_ids.len() == 1 {
            let label = criteria
                .selected_custom_status_ids
                .iter()
                .next()
                .and_then(|id| meta.custom_status_label(*id));
            if let Some(label) = label {
                return label.to_string();
            }
        }
        return "Multiple Filters".to_string();
    }

    match criteria.filter {
        SubmissionListFilter::All => "All Submissions".to_string(),
        SubmissionListFilter::Late => "Submitted Late".to_string(),
        SubmissionListFilter::Missing => "Haven't Submitted Yet".to_string(),
        SubmissionListFilter::NotGraded => "Haven't Been Graded".to_string(),
        SubmissionListFilter::Graded => "Graded".to_string(),
        SubmissionListFilter::Submitted => "Submitted".to_string(),
        SubmissionListFilter::AboveValue(value) => {
            format!("Scored More than {}", format_decimal(value, Some(2)))
        }
        SubmissionListFilter::BelowValue(value) => {
            format!("Scored Less than {}", format_decimal(value, Some(2)))
        }
    }
}
