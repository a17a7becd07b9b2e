use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
};
use time::macros::datetime;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::core::{config::Settings, state::AppState};
use crate::domain::{
    Assignee, Assignment, CustomGradeStatus, DifferentiationTag, GradeableRow, GradingType,
    Section, StudentAssignee, SubmissionRecord,
};
use crate::repositories::{GradeableSource, SourceError};

pub(crate) const FIXTURE_COURSE_ID: i64 = 1;
pub(crate) const FIXTURE_ASSIGNMENT_ID: i64 = 10;

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("ROSTER_ENV", "test");
    std::env::set_var("ROSTER_STRICT_CONFIG", "0");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    for key in [
        "ENVIRONMENT",
        "ROSTER_HOST",
        "ROSTER_PORT",
        "ROSTER_DATA_ROOT",
        "API_V1_STR",
        "PROJECT_NAME",
        "BACKEND_CORS_ORIGINS",
        "ANONYMOUS_SHUFFLE_SEED",
        "GRADE_DECIMAL_PLACES",
        "SEARCH_CASE_INSENSITIVE",
        "MAX_DERIVE_ROWS",
    ] {
        std::env::remove_var(key);
    }
}

fn student(id: i64, name: &str, sortable_name: &str, section_ids: &[i64]) -> Assignee {
    Assignee::Student(StudentAssignee {
        id,
        name: name.to_string(),
        sortable_name: Some(sortable_name.to_string()),
        avatar_url: None,
        is_fake_student: false,
        section_ids: section_ids.to_vec(),
    })
}

fn graded(id: i64, score: f64) -> SubmissionRecord {
    SubmissionRecord {
        id,
        attempt: 1,
        grade: Some(format!("{score}")),
        score: Some(score),
        is_grade_matches_current_submission: true,
        posted_at: Some(datetime!(2025-01-05 12:00 UTC)),
        submitted_at: Some(datetime!(2025-01-02 09:00 UTC)),
        ..SubmissionRecord::default()
    }
}

/// Nine students covering every submission state, in a fixed input order.
pub(crate) fn fixture_roster() -> Vec<GradeableRow> {
    vec![
        GradeableRow {
            assignee: student(1, "Late Student", "Student, Late", &[100]),
            submission: Some(SubmissionRecord {
                id: 1,
                attempt: 1,
                late: true,
                submitted_at: Some(datetime!(2025-01-04 18:30 UTC)),
                ..SubmissionRecord::default()
            }),
        },
        GradeableRow {
            assignee: student(2, "On Time Student", "Student, On Time", &[100]),
            submission: Some(SubmissionRecord {
                id: 2,
                attempt: 1,
                submitted_at: Some(datetime!(2025-01-01 08:00 UTC)),
                ..SubmissionRecord::default()
            }),
        },
        GradeableRow {
            assignee: student(3, "Missing Student", "Student, Missing", &[200]),
            submission: Some(SubmissionRecord {
                id: 3,
                missing: true,
                ..SubmissionRecord::default()
            }),
        },
        GradeableRow {
            assignee: student(4, "Good Graded Student", "Student, Good Graded", &[200]),
            submission: Some(graded(4, 10.0)),
        },
        GradeableRow {
            assignee: student(5, "Bad Graded Student", "Student, Bad Graded", &[100]),
            submission: Some(graded(5, 0.0)),
        },
        GradeableRow {
            assignee: student(6, "Excused Student", "Student, Excused", &[]),
            submission: Some(SubmissionRecord {
                id: 6,
                attempt: 1,
                excused: true,
                grade: Some("EX".to_string()),
                is_grade_matches_current_submission: true,
                posted_at: Some(datetime!(2025-01-05 12:00 UTC)),
                ..SubmissionRecord::default()
            }),
        },
        GradeableRow {
            assignee: student(7, "Updated Grade Student", "Student, Updated Grade", &[200]),
            submission: Some(SubmissionRecord {
                is_grade_matches_current_submission: false,
                ..graded(7, 10.0)
            }),
        },
        GradeableRow {
            assignee: student(8, "Not Submitted Student", "Student, Not Submitted", &[100]),
            submission: None,
        },
        GradeableRow {
            assignee: student(9, "Custom Status Student", "Student, Custom Status", &[200]),
            submission: Some(SubmissionRecord {
                id: 9,
                attempt: 1,
                custom_grade_status_id: Some(1),
                is_grade_matches_current_submission: true,
                ..SubmissionRecord::default()
            }),
        },
    ]
}

/// Serves one fixed course and assignment from memory.
pub(crate) struct InMemorySource {
    course_id: i64,
    assignment: Assignment,
    rows: Vec<GradeableRow>,
    custom_grade_statuses: Vec<CustomGradeStatus>,
    sections: Vec<Section>,
    differentiation_tags: Vec<DifferentiationTag>,
}

impl InMemorySource {
    pub(crate) fn with_fixture_roster() -> Self {
        Self {
            course_id: FIXTURE_COURSE_ID,
            assignment: Assignment {
                id: FIXTURE_ASSIGNMENT_ID,
                name: "Fixture Assignment".to_string(),
                grading_type: GradingType::Points,
                anonymous_grading: false,
                points_possible: Some(10.0),
            },
            rows: fixture_roster(),
            custom_grade_statuses: vec![CustomGradeStatus {
                id: 1,
                name: "Custom Status 1".to_string(),
            }],
            sections: vec![
                Section { id: 100, name: "Morning".to_string() },
                Section { id: 200, name: "Evening".to_string() },
            ],
            differentiation_tags: vec![DifferentiationTag {
                id: "advanced".to_string(),
                name: "Advanced".to_string(),
                group_set_name: None,
                user_ids: vec![4, 5],
            }],
        }
    }

    fn check(&self, course_id: i64, assignment_id: Option<i64>) -> Result<(), SourceError> {
        let assignment_matches = assignment_id.map_or(true, |id| id == self.assignment.id);
        if course_id == self.course_id && assignment_matches {
            Ok(())
        } else {
            Err(SourceError::NotFound(format!("course {course_id}")))
        }
    }
}

#[async_trait]
impl GradeableSource for InMemorySource {
    async fn assignment(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Assignment, SourceError> {
        self.check(course_id, Some(assignment_id))?;
        Ok(self.assignment.clone())
    }

    async fn gradeable_submissions(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Vec<GradeableRow>, SourceError> {
        self.check(course_id, Some(assignment_id))?;
        Ok(self.rows.clone())
    }

    async fn custom_grade_statuses(
        &self,
        course_id: i64,
    ) -> Result<Vec<CustomGradeStatus>, SourceError> {
        self.check(course_id, None)?;
        Ok(self.custom_grade_statuses.clone())
    }

    async fn sections(&self, course_id: i64) -> Result<Vec<Section>, SourceError> {
        self.check(course_id, None)?;
        Ok(self.sections.clone())
    }

    async fn differentiation_tags(
        &self,
        course_id: i64,
    ) -> Result<Vec<DifferentiationTag>, SourceError> {
        self.check(course_id, None)?;
        Ok(self.differentiation_tags.clone())
    }
}

/// Every lookup reports a missing snapshot.
pub(crate) struct FailingSource;

#[async_trait]
impl GradeableSource for FailingSource {
    async fn assignment(&self, course_id: i64, _: i64) -> Result<Assignment, SourceError> {
        Err(SourceError::NotFound(format!("course {course_id}")))
    }

    async fn gradeable_submissions(
        &self,
        course_id: i64,
        _: i64,
    ) -> Result<Vec<GradeableRow>, SourceError> {
        Err(SourceError::NotFound(format!("course {course_id}")))
    }

    async fn custom_grade_statuses(
        &self,
        course_id: i64,
    ) -> Result<Vec<CustomGradeStatus>, SourceError> {
        Err(SourceError::NotFound(format!("course {course_id}")))
    }

    async fn sections(&self, course_id: i64) -> Result<Vec<Section>, SourceError> {
        Err(SourceError::NotFound(format!("course {course_id}")))
    }

    async fn differentiation_tags(
        &self,
        course_id: i64,
    ) -> Result<Vec<DifferentiationTag>, SourceError> {
        Err(SourceError::NotFound(format!("course {course_id}")))
    }

    async fn ping(&self) -> Result<(), SourceError> {
        Err(SourceError::NotFound("data root".to_string()))
    }
}

pub(crate) fn fixture_state(settings: Settings) -> AppState {
    AppState::new(settings, Arc::new(InMemorySource::with_fixture_roster()))
}

pub(crate) fn failing_state(settings: Settings) -> AppState {
    AppState::new(settings, Arc::new(FailingSource))
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}
