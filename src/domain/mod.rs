pub mod models;
pub mod types;

pub use models::{
    Assignee, Assignment, AssignmentMeta, CustomGradeStatus, DifferentiationTag, DisplayRow,
    GradeableRow, GroupAssignee, Recipient, Section, StudentAssignee, SubmissionRecord,
};
pub use types::{GradingType, SubmissionTag};
