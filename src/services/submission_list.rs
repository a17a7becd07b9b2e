//! Filter, sort and derive pipeline behind the submission list, plus the
//! stateful session that loads an assignment and re-derives on every change.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{
    Assignment, AssignmentMeta, CustomGradeStatus, DifferentiationTag, DisplayRow, GradeableRow,
    Recipient, Section,
};
use crate::repositories::{GradeableSource, SourceError};
use crate::services::message_recipients::{
    compute_eligible_message_recipients, message_draft, MessageDraft,
};
use crate::services::submission_filter::{
    self, FilterCriteria, SearchMode, SubmissionListFilter,
};
use crate::services::submission_sort::{
    shuffle_anonymous, sort_rows, SubmissionSortOrder, DEFAULT_ANONYMOUS_SHUFFLE_SEED,
};
use crate::services::submission_state::{derive_row, GradeFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub format: GradeFormat,
    pub anonymous_seed: u64,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self { format: GradeFormat::default(), anonymous_seed: DEFAULT_ANONYMOUS_SHUFFLE_SEED }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubmissionListQuery {
    pub criteria: FilterCriteria,
    pub sort: Option<SubmissionSortOrder>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionList {
    pub header_title: String,
    pub total_count: usize,
    pub rows: Vec<DisplayRow>,
}

/// Filters, orders and derives display rows. With no sort order and no
/// anonymous grading the input order is kept.
pub fn build_submission_list(
    rows: &[GradeableRow],
    meta: &AssignmentMeta,
    differentiation_tags: &[DifferentiationTag],
    query: &SubmissionListQuery,
    options: ListOptions,
) -> SubmissionList {
    let mut selected = submission_filter::filter(rows, meta, &query.criteria, differentiation_tags);

    if let Some(order) = query.sort {
        sort_rows(&mut selected, order);
    }
    if meta.anonymous_grading {
        shuffle_anonymous(&mut selected, options.anonymous_seed);
    }

    let derived: Vec<DisplayRow> =
        selected.into_iter().map(|row| derive_row(row, meta, options.format)).collect();

    metrics::counter!("submission_list_derivations_total").increment(1);
    metrics::histogram!("submission_list_rows").record(derived.len() as f64);
    tracing::debug!(
        input_rows = rows.len(),
        output_rows = derived.len(),
        sort = ?query.sort,
        anonymous = meta.anonymous_grading,
        "Derived submission list"
    );

    SubmissionList {
        header_title: submission_filter::header_title(&query.criteria, meta),
        total_count: rows.len(),
        rows: derived,
    }
}

/// Everything fetched for one assignment of one course.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedAssignment {
    pub course_id: i64,
    pub assignment: Assignment,
    pub meta: AssignmentMeta,
    pub rows: Vec<GradeableRow>,
    pub sections: Vec<Section>,
    pub custom_grade_statuses: Vec<CustomGradeStatus>,
    pub differentiation_tags: Vec<DifferentiationTag>,
}

impl LoadedAssignment {
    pub fn submission_list(
        &self,
        query: &SubmissionListQuery,
        options: ListOptions,
    ) -> SubmissionList {
        build_submission_list(&self.rows, &self.meta, &self.differentiation_tags, query, options)
    }

    pub fn recipients(&self) -> Vec<Recipient> {
        compute_eligible_message_recipients(&self.rows, &self.meta)
    }

    /// Draft addressed to the ungraded recipients; the subject always names
    /// that group, whatever filter the list currently shows.
    pub fn message_draft(&self) -> MessageDraft {
        let criteria = FilterCriteria::with_filter(SubmissionListFilter::NotGraded);
        let header = submission_filter::header_title(&criteria, &self.meta);
        message_draft(self.course_id, &self.assignment.name, &header, self.recipients())
    }
}

pub async fn load_assignment(
    source: &dyn GradeableSource,
    course_id: i64,
    assignment_id: i64,
) -> Result<LoadedAssignment, SourceError> {
    let (assignment, rows, custom_grade_statuses, sections, differentiation_tags) =
        tokio::try_join!(
            source.assignment(course_id, assignment_id),
            source.gradeable_submissions(course_id, assignment_id),
            source.custom_grade_statuses(course_id),
            source.sections(course_id),
            source.differentiation_tags(course_id),
        )?;

    let meta = AssignmentMeta::from_assignment(&assignment, &custom_grade_statuses);
    Ok(LoadedAssignment {
        course_id,
        assignment,
        meta,
        rows,
        sections,
        custom_grade_statuses,
        differentiation_tags,
    })
}

/// Single-owner view state of one assignment's submission list.
pub struct SubmissionListSession {
    source: Arc<dyn GradeableSource>,
    course_id: i64,
    assignment_id: i64,
    options: ListOptions,
    query: SubmissionListQuery,
    data: Option<LoadedAssignment>,
    loading: bool,
    refreshing: bool,
    error: bool,
}

impl SubmissionListSession {
    pub fn new(
        source: Arc<dyn GradeableSource>,
        course_id: i64,
        assignment_id: i64,
        options: ListOptions,
    ) -> Self {
        Self {
            source,
            course_id,
            assignment_id,
            options,
            query: SubmissionListQuery::default(),
            data: None,
            loading: false,
            refreshing: false,
            error: false,
        }
    }

    pub async fn load(&mut self) -> Result<(), SourceError> {
        self.loading = true;
        self.fetch().await
    }

    /// Reloads without dropping the rows already shown.
    pub async fn refresh(&mut self) -> Result<(), SourceError> {
        self.refreshing = true;
        self.fetch().await
    }

    async fn fetch(&mut self) -> Result<(), SourceError> {
        self.error = false;
        let result =
            load_assignment(self.source.as_ref(), self.course_id, self.assignment_id).await;
        self.loading = false;
        self.refreshing = false;

        match result {
            Ok(data) => {
                tracing::info!(
                    course_id = self.course_id,
                    assignment_id = self.assignment_id,
                    rows = data.rows.len(),
                    "Loaded submission list"
                );
                self.data = Some(data);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    course_id = self.course_id,
                    assignment_id = self.assignment_id,
                    "Failed to load submission list"
                );
                self.error = true;
                Err(err)
            }
        }
    }

    pub fn set_query(&mut self, query: SubmissionListQuery) {
        self.query = query;
    }

    pub fn search(&mut self, text: &str, mode: SearchMode) {
        self.query.criteria.search = text.to_string();
        self.query.criteria.search_mode = mode;
    }

    pub fn query(&self) -> &SubmissionListQuery {
        &self.query
    }

    pub fn data(&self) -> Option<&LoadedAssignment> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn list(&self) -> Option<SubmissionList> {
        self.data.as_ref().map(|data| data.submission_list(&self.query, self.options))
    }

    /// Derived rows for the current query; empty until a load succeeds.
    pub fn rows(&self) -> Vec<DisplayRow> {
        self.list().map(|list| list.rows).unwrap_or_default()
    }

    pub fn header_title(&self) -> String {
        let meta = self.data.as_ref().map(|data| data.meta.clone()).unwrap_or_default();
        submission_filter::header_title(&self.query.criteria, &meta)
    }

    pub fn recipients(&self) -> Vec<Recipient> {
        self.data.as_ref().map(LoadedAssignment::recipients).unwrap_or_default()
    }

    pub fn message_draft(&self) -> Option<MessageDraft> {
        self.data.as_ref().map(LoadedAssignment::message_draft)
    }
}
