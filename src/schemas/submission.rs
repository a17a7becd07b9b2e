use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::{Assignment, AssignmentMeta, DifferentiationTag, DisplayRow, GradeableRow};
use crate::services::submission_filter::SubmissionListFilter;
use crate::services::submission_list::SubmissionList;
use crate::services::submission_sort::SubmissionSortOrder;

/// Stateless derivation over rows supplied by the caller.
#[derive(Debug, Deserialize, Validate)]
pub(crate) struct DeriveSubmissionListRequest {
    #[serde(default)]
    pub(crate) assignment: AssignmentMeta,
    #[serde(default)]
    pub(crate) rows: Vec<GradeableRow>,
    #[serde(default)]
    pub(crate) filter: SubmissionListFilter,
    #[serde(default)]
    #[validate(length(max = 200, message = "search must be at most 200 characters"))]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) sort: Option<SubmissionSortOrder>,
    #[serde(default)]
    pub(crate) section_ids: Vec<i64>,
    #[serde(default)]
    pub(crate) custom_status_ids: Vec<i64>,
    #[serde(default)]
    pub(crate) differentiation_tags: Vec<DifferentiationTag>,
    #[serde(default)]
    pub(crate) differentiation_tag_ids: Vec<String>,
    #[serde(default)]
    pub(crate) include_students_without_tags: bool,
}

/// Query string of the stored-assignment endpoints. Id lists are comma separated.
#[derive(Debug, Default, Deserialize, Validate)]
pub(crate) struct SubmissionListParams {
    #[serde(default)]
    pub(crate) category: Option<String>,
    #[serde(default)]
    pub(crate) threshold: Option<f64>,
    #[serde(default)]
    pub(crate) section_ids: Option<String>,
    #[serde(default)]
    pub(crate) custom_status_ids: Option<String>,
    #[serde(default)]
    pub(crate) differentiation_tag_ids: Option<String>,
    #[serde(default)]
    pub(crate) include_students_without_tags: bool,
    #[serde(default)]
    #[validate(length(max = 200, message = "search must be at most 200 characters"))]
    pub(crate) search: Option<String>,
    #[serde(default)]
    pub(crate) sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AssignmentSummary {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) anonymous_grading: bool,
}

impl From<&Assignment> for AssignmentSummary {
    fn from(assignment: &Assignment) -> Self {
        Self {
            id: assignment.id,
            name: assignment.name.clone(),
            anonymous_grading: assignment.anonymous_grading,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SubmissionListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) assignment: Option<AssignmentSummary>,
    pub(crate) header_title: String,
    pub(crate) total_count: usize,
    pub(crate) rows: Vec<DisplayRow>,
}

impl SubmissionListResponse {
    pub(crate) fn new(list: SubmissionList, assignment: Option<AssignmentSummary>) -> Self {
        Self {
            assignment,
            header_title: list.header_title,
            total_count: list.total_count,
            rows: list.rows,
        }
    }
}
