//! Derives display state (status tags, grade text, hidden flag) for rows of
//! the submission list. Every function here is pure.

use crate::domain::{
    AssignmentMeta, DisplayRow, GradeableRow, GradingType, SubmissionRecord, SubmissionTag,
};

const EMPTY_GRADE: &str = "-";
const PERCENT_FALLBACK_DECIMALS: usize = 2;
/// Upper bound on rounding precision; larger requests are clamped.
pub const MAX_GRADE_DECIMAL_PLACES: usize = 10;

/// Caller-controlled grade rendering. `decimal_places: None` keeps the API
/// grade string verbatim and prints scores with the minimal digits needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GradeFormat {
    pub decimal_places: Option<usize>,
}

impl GradeFormat {
    pub fn rounded(decimal_places: usize) -> Self {
        Self { decimal_places: Some(decimal_places) }
    }
}

pub fn derive_tags(row: &GradeableRow, meta: &AssignmentMeta) -> Vec<SubmissionTag> {
    submission_tags(row.submission.as_ref(), meta)
}

pub fn submission_tags(
    submission: Option<&SubmissionRecord>,
    meta: &AssignmentMeta,
) -> Vec<SubmissionTag> {
    let Some(submission) = submission else {
        return vec![SubmissionTag::NotSubmitted];
    };

    if let Some(label) = active_custom_status(submission, meta) {
        return vec![SubmissionTag::custom(label)];
    }

    if submission.excused {
        return vec![SubmissionTag::Excused];
    }

    if submission.has_grade() && submission.is_grade_matches_current_submission {
        return vec![SubmissionTag::Graded];
    }

    if submission.late {
        vec![SubmissionTag::Late, SubmissionTag::NeedsGrading]
    } else if submission.missing {
        vec![SubmissionTag::Missing]
    } else {
        vec![SubmissionTag::Submitted, SubmissionTag::NeedsGrading]
    }
}

/// Label of the submission's custom grade status, if it resolves against the
/// assignment's known statuses. Unknown ids are ignored.
pub fn active_custom_status<'a>(
    submission: &SubmissionRecord,
    meta: &'a AssignmentMeta,
) -> Option<&'a str> {
    submission.custom_grade_status_id.and_then(|id| meta.custom_status_label(id))
}

pub fn format_grade(submission: Option<&SubmissionRecord>, meta: &AssignmentMeta) -> String {
    format_grade_with(submission, meta, GradeFormat::default())
}

pub fn format_grade_with(
    submission: Option<&SubmissionRecord>,
    meta: &AssignmentMeta,
    format: GradeFormat,
) -> String {
    let Some(submission) = submission else {
        return EMPTY_GRADE.to_string();
    };

    if active_custom_status(submission, meta).is_some() {
        return EMPTY_GRADE.to_string();
    }

    if submission.excused {
        return String::new();
    }

    let grade = submission.grade.as_deref().map(str::trim).filter(|grade| !grade.is_empty());
    if grade.is_none() && submission.score.is_none() {
        return EMPTY_GRADE.to_string();
    }

    match grade {
        Some("complete") => return "Complete".to_string(),
        Some("incomplete") => return "Incomplete".to_string(),
        _ => {}
    }

    match meta.grading_type {
        GradingType::Percent => format_percent(grade, submission.score, format),
        GradingType::LetterGrade | GradingType::GpaScale
            if grade.is_some_and(|grade| grade.parse::<f64>().is_err()) =>
        {
            grade.unwrap_or(EMPTY_GRADE).to_string()
        }
        _ => match submission.score {
            Some(score) => format_decimal(score, format.decimal_places),
            None => grade.unwrap_or(EMPTY_GRADE).to_string(),
        },
    }
}

fn format_percent(grade: Option<&str>, score: Option<f64>, format: GradeFormat) -> String {
    if let Some(grade) = grade {
        let numeric = grade.trim_end_matches('%').trim();
        return match (format.decimal_places, numeric.parse::<f64>()) {
            (Some(places), Ok(value)) => format!("{}%", format_decimal(value, Some(places))),
            (None, Ok(_)) if !grade.ends_with('%') => format!("{grade}%"),
            _ => grade.to_string(),
        };
    }

    match score {
        Some(score) => format!(
            "{}%",
            format_decimal(score, Some(format.decimal_places.unwrap_or(PERCENT_FALLBACK_DECIMALS)))
        ),
        None => EMPTY_GRADE.to_string(),
    }
}

/// Renders a number without a trailing fractional part when it is whole;
/// `places` rounds first (at most [`MAX_GRADE_DECIMAL_PLACES`]), then trims
/// trailing zeros.
pub fn format_decimal(value: f64, places: Option<usize>) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    let rendered = match places {
        Some(places) => {
            let places = places.min(MAX_GRADE_DECIMAL_PLACES);
            format!("{value:.places$}")
        }
        None => format!("{value}"),
    };

    if rendered.contains('.') {
        let trimmed = rendered.trim_end_matches('0').trim_end_matches('.');
        if trimmed == "-0" {
            return "0".to_string();
        }
        trimmed.to_string()
    } else {
        rendered
    }
}

pub fn is_hidden(submission: Option<&SubmissionRecord>) -> bool {
    submission.is_some_and(|submission| submission.posted_at.is_none())
}

pub fn derive_row(row: &GradeableRow, meta: &AssignmentMeta, format: GradeFormat) -> DisplayRow {
    let submission = row.submission.as_ref();
    let student = row.assignee.as_student();

    DisplayRow {
        assignee_id: row.assignee.id(),
        submission_id: submission.map(|submission| submission.id),
        display_name: row.assignee.name().to_string(),
        is_fake_student: student.is_some_and(|student| student.is_fake_student),
        avatar_url: student.and_then(|student| student.avatar_url.clone()),
        tags: submission_tags(submission, meta),
        grade_text: format_grade_with(submission, meta, format),
        is_hidden: is_hidden(submission),
        is_group: row.assignee.is_group(),
    }
}

pub fn derive_rows(
    rows: &[GradeableRow],
    meta: &AssignmentMeta,
    format: GradeFormat,
) -> Vec<DisplayRow> {
    rows.iter().map(|row| derive_row(row, meta, format)).collect()
}
