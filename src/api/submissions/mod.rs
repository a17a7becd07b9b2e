use std::collections::BTreeSet;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::validation::{
    parse_category, parse_id_list, parse_sort, validate_filter, validate_row_count,
};
use crate::core::state::AppState;
use crate::schemas::submission::{
    AssignmentSummary, DeriveSubmissionListRequest, SubmissionListParams, SubmissionListResponse,
};
use crate::services::message_recipients::MessageDraft;
use crate::services::submission_filter::{
    DifferentiationTagSelection, FilterCriteria, SearchMode,
};
use crate::services::submission_list::{
    build_submission_list, load_assignment, LoadedAssignment, SubmissionListQuery,
};


pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/submission-list/derive", post(derive_submission_list))
        .route(
            "/courses/:course_id/assignments/:assignment_id/submissions",
            get(list_submissions),
        )
        .route(
            "/courses/:course_id/assignments/:assignment_id/message-recipients",
            get(message_recipients),
        )
}

async fn derive_submission_list(
    State(state): State<AppState>,
    Json(payload): Json<DeriveSubmissionListRequest>,
) -> Result<Json<SubmissionListResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    validate_filter(&payload.filter)?;
    validate_row_count(payload.rows.len(), state.settings().list().max_derive_rows)?;

    let query = SubmissionListQuery {
        criteria: FilterCriteria {
            filter: payload.filter,
            selected_section_ids: payload.section_ids,
            selected_custom_status_ids: payload.custom_status_ids.into_iter().collect(),
            differentiation: DifferentiationTagSelection {
                tag_ids: payload.differentiation_tag_ids.into_iter().collect(),
                include_students_without_tags: payload.include_students_without_tags,
            },
            search: payload.search.unwrap_or_default(),
            search_mode: state.settings().search_mode(),
        },
        sort: payload.sort,
    };

    let list = build_submission_list(
        &payload.rows,
        &payload.assignment,
        &payload.differentiation_tags,
        &query,
        state.settings().list_options(),
    );

    Ok(Json(SubmissionListResponse::new(list, None)))
}

async fn list_submissions(
    Path((course_id, assignment_id)): Path<(i64, i64)>,
    Query(params): Query<SubmissionListParams>,
    State(state): State<AppState>,
) -> Result<Json<SubmissionListResponse>, ApiError> {
    let query = list_query(&params, state.settings().search_mode())?;
    let data = load(&state, course_id, assignment_id).await?;

    let list = data.submission_list(&query, state.settings().list_options());
    Ok(Json(SubmissionListResponse::new(list, Some(AssignmentSummary::from(&data.assignment)))))
}

async fn message_recipients(
    Path((course_id, assignment_id)): Path<(i64, i64)>,
    State(state): State<AppState>,
) -> Result<Json<MessageDraft>, ApiError> {
    let data = load(&state, course_id, assignment_id).await?;

    let draft = data.message_draft();
    tracing::info!(
        course_id,
        assignment_id,
        recipients = draft.recipients.len(),
        "Prepared message draft"
    );
    Ok(Json(draft))
}

async fn load(
    state: &AppState,
    course_id: i64,
    assignment_id: i64,
) -> Result<LoadedAssignment, ApiError> {
    load_assignment(state.source(), course_id, assignment_id)
        .await
        .map_err(|e| ApiError::from_source(e, "Assignment not found"))
}

fn list_query(
    params: &SubmissionListParams,
    search_mode: SearchMode,
) -> Result<SubmissionListQuery, ApiError> {
    params.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let filter = parse_category(params.category.as_deref(), params.threshold)?;
    let selected_section_ids = parse_id_list("section_ids", params.section_ids.as_deref())?;
    let selected_custom_status_ids: BTreeSet<i64> =
        parse_id_list("custom_status_ids", params.custom_status_ids.as_deref())?
            .into_iter()
            .collect();
    let tag_ids: BTreeSet<String> =
        parse_id_list("differentiation_tag_ids", params.differentiation_tag_ids.as_deref())?
            .into_iter()
            .collect();

    Ok(SubmissionListQuery {
        criteria: FilterCriteria {
            filter,
            selected_section_ids,
            selected_custom_status_ids,
            differentiation: DifferentiationTagSelection {
                tag_ids,
                include_students_without_tags: params.include_students_without_tags,
            },
            search: params.search.clone().unwrap_or_default(),
            search_mode,
        },
        sort: parse_sort(params.sort.as_deref())?,
    })
}
