use rand::rngs::StdRng;
use rand::{seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::domain::GradeableRow;

pub const DEFAULT_ANONYMOUS_SHUFFLE_SEED: u64 = 1234;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionSortOrder {
    StudentSortableName,
    StudentName,
    SubmissionDate,
    SubmissionStatus,
}

impl SubmissionSortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "STUDENT_SORTABLE_NAME" => Some(Self::StudentSortableName),
            "STUDENT_NAME" => Some(Self::StudentName),
            "SUBMISSION_DATE" => Some(Self::SubmissionDate),
            "SUBMISSION_STATUS" => Some(Self::SubmissionStatus),
            _ => None,
        }
    }
}

/// Stable sort; rows comparing equal keep their input order.
pub fn sort_rows(rows: &mut [&GradeableRow], order: SubmissionSortOrder) {
    match order {
        SubmissionSortOrder::StudentSortableName => {
            rows.sort_by_cached_key(|row| sortable_key(row))
        }
        SubmissionSortOrder::StudentName => {
            rows.sort_by_cached_key(|row| row.assignee.name().to_lowercase())
        }
        SubmissionSortOrder::SubmissionDate => rows.sort_by(|left, right| {
            submitted_at_key(right)
                .cmp(&submitted_at_key(left))
                .then_with(|| sortable_key(left).cmp(&sortable_key(right)))
        }),
        SubmissionSortOrder::SubmissionStatus => rows.sort_by(|left, right| {
            status_rank(left)
                .cmp(&status_rank(right))
                .then_with(|| sortable_key(left).cmp(&sortable_key(right)))
        }),
    }
}

/// Deterministic shuffle used for anonymous grading so the list does not
/// reveal alphabetical order yet stays stable between refreshes.
pub fn shuffle_anonymous<T>(rows: &mut [T], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    rows.shuffle(&mut rng);
}

fn sortable_key(row: &GradeableRow) -> String {
    row.assignee.sortable_name().to_lowercase()
}

fn submitted_at_key(row: &GradeableRow) -> i128 {
    row.submission
        .as_ref()
        .and_then(|submission| submission.submitted_at)
        .map(|submitted_at| submitted_at.unix_timestamp_nanos())
        .unwrap_or(0)
}

fn status_rank(row: &GradeableRow) -> u8 {
    match row.submission.as_ref() {
        None => 3,
        Some(submission) if submission.missing => 2,
        Some(submission) if submission.late => 1,
        Some(_) => 0,
    }
}
