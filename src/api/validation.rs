use std::str::FromStr;

use crate::api::errors::ApiError;
use crate::services::submission_filter::SubmissionListFilter;
use crate::services::submission_sort::SubmissionSortOrder;

pub(crate) fn parse_category(
    category: Option<&str>,
    threshold: Option<f64>,
) -> Result<SubmissionListFilter, ApiError> {
    let Some(category) = category.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(SubmissionListFilter::All);
    };

    let filter = match category.to_ascii_uppercase().as_str() {
        "ALL" => SubmissionListFilter::All,
        "LATE" => SubmissionListFilter::Late,
        "MISSING" => SubmissionListFilter::Missing,
        "GRADED" => SubmissionListFilter::Graded,
        "NOT_GRADED" => SubmissionListFilter::NotGraded,
        "SUBMITTED" => SubmissionListFilter::Submitted,
        "ABOVE_VALUE" => SubmissionListFilter::AboveValue(require_threshold(threshold)?),
        "BELOW_VALUE" => SubmissionListFilter::BelowValue(require_threshold(threshold)?),
        other => return Err(ApiError::BadRequest(format!("Unknown category '{other}'"))),
    };

    Ok(filter)
}

fn require_threshold(threshold: Option<f64>) -> Result<f64, ApiError> {
    let value = threshold.ok_or_else(|| {
        ApiError::BadRequest("threshold is required for value categories".to_string())
    })?;
    validate_threshold(value)?;
    Ok(value)
}

pub(crate) fn validate_threshold(value: f64) -> Result<(), ApiError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ApiError::BadRequest("threshold must be a finite number".to_string()))
    }
}

pub(crate) fn validate_filter(filter: &SubmissionListFilter) -> Result<(), ApiError> {
    match filter {
        SubmissionListFilter::AboveValue(value) | SubmissionListFilter::BelowValue(value) => {
            validate_threshold(*value)
        }
        _ => Ok(()),
    }
}

pub(crate) fn parse_sort(raw: Option<&str>) -> Result<Option<SubmissionSortOrder>, ApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => SubmissionSortOrder::parse(value)
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("Unknown sort order '{value}'"))),
    }
}

/// Comma separated ids; blanks between commas are skipped.
pub(crate) fn parse_id_list<T: FromStr>(
    field: &str,
    raw: Option<&str>,
) -> Result<Vec<T>, ApiError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<T>()
                .map_err(|_| ApiError::BadRequest(format!("Invalid id '{item}' in {field}")))
        })
        .collect()
}

pub(crate) fn validate_row_count(count: usize, max: usize) -> Result<(), ApiError> {
    if count <= max {
        Ok(())
    } else {
        Err(ApiError::PayloadTooLarge(format!("At most {max} rows can be derived per request")))
    }
}
