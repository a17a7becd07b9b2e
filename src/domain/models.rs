use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::types::{GradingType, SubmissionTag};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentAssignee {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sortable_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_fake_student: bool,
    /// Course sections the student is enrolled in. Empty means no section data.
    #[serde(default)]
    pub section_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupAssignee {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub member_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assignee {
    Student(StudentAssignee),
    Group(GroupAssignee),
}

impl Assignee {
    pub fn id(&self) -> i64 {
        match self {
            Self::Student(student) => student.id,
            Self::Group(group) => group.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Student(student) => &student.name,
            Self::Group(group) => &group.name,
        }
    }

    /// Sort key: the student's sortable name when known, the display name otherwise.
    pub fn sortable_name(&self) -> &str {
        match self {
            Self::Student(student) => student.sortable_name.as_deref().unwrap_or(&student.name),
            Self::Group(group) => &group.name,
        }
    }

    pub fn as_student(&self) -> Option<&StudentAssignee> {
        match self {
            Self::Student(student) => Some(student),
            Self::Group(_) => None,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SubmissionRecord {
    pub id: i64,
    #[serde(default)]
    pub attempt: i64,
    #[serde(default)]
    pub late: bool,
    #[serde(default)]
    pub missing: bool,
    #[serde(default)]
    pub excused: bool,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub is_grade_matches_current_submission: bool,
    #[serde(default)]
    pub custom_grade_status_id: Option<i64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub posted_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub submitted_at: Option<OffsetDateTime>,
}

impl SubmissionRecord {
    pub fn has_grade(&self) -> bool {
        self.grade.as_deref().is_some_and(|grade| !grade.trim().is_empty())
    }
}

/// One assignee paired with its submission, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeableRow {
    pub assignee: Assignee,
    #[serde(default)]
    pub submission: Option<SubmissionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AssignmentMeta {
    #[serde(default)]
    pub grading_type: GradingType,
    #[serde(default)]
    pub anonymous_grading: bool,
    #[serde(default)]
    pub custom_grade_statuses: BTreeMap<i64, String>,
}

impl AssignmentMeta {
    pub fn from_assignment(assignment: &Assignment, statuses: &[CustomGradeStatus]) -> Self {
        Self {
            grading_type: assignment.grading_type,
            anonymous_grading: assignment.anonymous_grading,
            custom_grade_statuses: statuses
                .iter()
                .map(|status| (status.id, status.name.clone()))
                .collect(),
        }
    }

    pub fn custom_status_label(&self, status_id: i64) -> Option<&str> {
        self.custom_grade_statuses.get(&status_id).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub grading_type: GradingType,
    #[serde(default)]
    pub anonymous_grading: bool,
    #[serde(default)]
    pub points_possible: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomGradeStatus {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferentiationTag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub group_set_name: Option<String>,
    #[serde(default)]
    pub user_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayRow {
    pub assignee_id: i64,
    pub submission_id: Option<i64>,
    pub display_name: String,
    pub is_fake_student: bool,
    pub avatar_url: Option<String>,
    pub tags: Vec<SubmissionTag>,
    pub grade_text: String,
    pub is_hidden: bool,
    pub is_group: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    pub id: i64,
    pub name: Option<String>,
}
