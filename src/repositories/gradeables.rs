use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{Assignment, CustomGradeStatus, DifferentiationTag, GradeableRow, Section};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("io error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid data in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read side of the gradebook: everything the submission list needs to render
/// one assignment.
#[async_trait]
pub trait GradeableSource: Send + Sync {
    async fn assignment(&self, course_id: i64, assignment_id: i64)
        -> Result<Assignment, SourceError>;

    async fn gradeable_submissions(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Vec<GradeableRow>, SourceError>;

    async fn custom_grade_statuses(
        &self,
        course_id: i64,
    ) -> Result<Vec<CustomGradeStatus>, SourceError>;

    async fn sections(&self, course_id: i64) -> Result<Vec<Section>, SourceError>;

    async fn differentiation_tags(
        &self,
        course_id: i64,
    ) -> Result<Vec<DifferentiationTag>, SourceError>;

    async fn ping(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct CourseFile {
    #[serde(default)]
    sections: Vec<Section>,
    #[serde(default)]
    custom_grade_statuses: Vec<CustomGradeStatus>,
    #[serde(default)]
    differentiation_tags: Vec<DifferentiationTag>,
}

#[derive(Debug, Deserialize)]
struct AssignmentFile {
    assignment: Assignment,
    #[serde(default)]
    submissions: Vec<GradeableRow>,
}

/// Snapshot exports laid out as
/// `{root}/courses/{course_id}/course.json` and
/// `{root}/courses/{course_id}/assignments/{assignment_id}.json`.
///
/// A course without `course.json` has no sections, statuses or tags.
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    root: PathBuf,
}

impl JsonDirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn course_path(&self, course_id: i64) -> PathBuf {
        self.root.join("courses").join(course_id.to_string()).join("course.json")
    }

    fn assignment_path(&self, course_id: i64, assignment_id: i64) -> PathBuf {
        self.root
            .join("courses")
            .join(course_id.to_string())
            .join("assignments")
            .join(format!("{assignment_id}.json"))
    }

    async fn course_file(&self, course_id: i64) -> Result<CourseFile, SourceError> {
        match read_json(&self.course_path(course_id)).await {
            Err(SourceError::NotFound(_)) => Ok(CourseFile::default()),
            other => other,
        }
    }

    async fn assignment_file(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<AssignmentFile, SourceError> {
        read_json(&self.assignment_path(course_id, assignment_id)).await
    }
}

#[async_trait]
impl GradeableSource for JsonDirectorySource {
    async fn assignment(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Assignment, SourceError> {
        Ok(self.assignment_file(course_id, assignment_id).await?.assignment)
    }

    async fn gradeable_submissions(
        &self,
        course_id: i64,
        assignment_id: i64,
    ) -> Result<Vec<GradeableRow>, SourceError> {
        Ok(self.assignment_file(course_id, assignment_id).await?.submissions)
    }

    async fn custom_grade_statuses(
        &self,
        course_id: i64,
    ) -> Result<Vec<CustomGradeStatus>, SourceError> {
        Ok(self.course_file(course_id).await?.custom_grade_statuses)
    }

    async fn sections(&self, course_id: i64) -> Result<Vec<Section>, SourceError> {
        Ok(self.course_file(course_id).await?.sections)
    }

    async fn differentiation_tags(
        &self,
        course_id: i64,
    ) -> Result<Vec<DifferentiationTag>, SourceError> {
        Ok(self.course_file(course_id).await?.differentiation_tags)
    }

    async fn ping(&self) -> Result<(), SourceError> {
        let metadata =
            tokio::fs::metadata(&self.root).await.map_err(|source| io_error(&self.root, source))?;
        if !metadata.is_dir() {
            return Err(SourceError::NotFound(self.root.display().to_string()));
        }
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| io_error(path, source))?;
    serde_json::from_slice(&bytes)
        .map_err(|source| SourceError::Parse { path: path.display().to_string(), source })
}

fn io_error(path: &Path, source: std::io::Error) -> SourceError {
    if source.kind() == std::io::ErrorKind::NotFound {
        SourceError::NotFound(path.display().to_string())
    } else {
        SourceError::Io { path: path.display().to_string(), source }
    }
}
