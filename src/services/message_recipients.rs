use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::{Assignee, AssignmentMeta, GradeableRow, Recipient};
use crate::services::submission_filter::SubmissionListFilter;
use crate::services::submission_state::derive_tags;

/// Everyone who still has work waiting to be graded. The rule is fixed to the
/// not-graded category no matter which filter the list currently shows.
pub fn compute_eligible_message_recipients(
    rows: &[GradeableRow],
    meta: &AssignmentMeta,
) -> Vec<Recipient> {
    let mut seen = HashSet::new();
    let mut recipients = Vec::new();

    for row in rows {
        let tags = derive_tags(row, meta);
        if !SubmissionListFilter::NotGraded.matches(row, &tags) {
            continue;
        }

        match &row.assignee {
            Assignee::Student(student) => {
                if seen.insert(student.id) {
                    recipients.push(Recipient { id: student.id, name: Some(student.name.clone()) });
                }
            }
            Assignee::Group(group) => {
                for member_id in &group.member_ids {
                    if seen.insert(*member_id) {
                        recipients.push(Recipient { id: *member_id, name: None });
                    }
                }
            }
        }
    }

    recipients
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageDraft {
    pub context_code: String,
    pub recipients: Vec<Recipient>,
    pub subject: String,
}

pub fn message_draft(
    course_id: i64,
    assignment_name: &str,
    header_title: &str,
    recipients: Vec<Recipient>,
) -> MessageDraft {
    MessageDraft {
        context_code: format!("course_{course_id}"),
        recipients,
        subject: format!("{header_title} on {assignment_name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GroupAssignee, StudentAssignee, SubmissionRecord};

    fn student(id: i64, name: &str, submission: Option<SubmissionRecord>) -> GradeableRow {
        GradeableRow {
            assignee: Assignee::Student(StudentAssignee {
                id,
                name: name.to_string(),
                sortable_name: None,
                avatar_url: None,
                is_fake_student: false,
                section_ids: Vec::new(),
            }),
            submission,
        }
    }

    fn group(id: i64, members: &[i64], submission: Option<SubmissionRecord>) -> GradeableRow {
        GradeableRow {
            assignee: Assignee::Group(GroupAssignee {
                id,
                name: format!("Group {id}"),
                member_ids: members.to_vec(),
            }),
            submission,
        }
    }

    fn pending(id: i64) -> SubmissionRecord {
        SubmissionRecord { id, attempt: 1, ..SubmissionRecord::default() }
    }

    fn graded(id: i64) -> SubmissionRecord {
        SubmissionRecord {
            id,
            attempt: 1,
            grade: Some("10".to_string()),
            score: Some(10.0),
            is_grade_matches_current_submission: true,
            ..SubmissionRecord::default()
        }
    }

    #[test]
    fn includes_only_rows_waiting_for_grades() {
        let rows = vec![
            student(1, "Pending", Some(pending(1))),
            student(2, "Graded", Some(graded(2))),
            student(3, "Not Submitted", None),
            student(4, "Late", Some(SubmissionRecord { late: true, ..pending(4) })),
        ];
        let ids: Vec<i64> = compute_eligible_message_recipients(&rows, &AssignmentMeta::default())
            .into_iter()
            .map(|recipient| recipient.id)
            .collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn expands_groups_and_removes_duplicates() {
        let rows = vec![
            student(2, "Member", Some(pending(1))),
            group(50, &[1, 2, 3], Some(pending(2))),
            group(51, &[3, 4], Some(pending(3))),
            group(52, &[9], Some(graded(4))),
        ];
        let recipients = compute_eligible_message_recipients(&rows, &AssignmentMeta::default());
        let ids: Vec<i64> = recipients.iter().map(|recipient| recipient.id).collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
        assert_eq!(recipients[0].name.as_deref(), Some("Member"));
        assert!(recipients[1].name.is_none());
    }

    #[test]
    fn custom_status_rows_are_not_recipients() {
        let mut meta = AssignmentMeta::default();
        meta.custom_grade_statuses.insert(7, "Absent".to_string());
        let rows = vec![student(
            1,
            "Absent Student",
            Some(SubmissionRecord { custom_grade_status_id: Some(7), ..pending(1) }),
        )];
        assert!(compute_eligible_message_recipients(&rows, &meta).is_empty());
    }

    #[test]
    fn draft_uses_course_context_and_header_subject() {
        let draft = message_draft(
            42,
            "Essay 1",
            "Haven't Been Graded",
            vec![Recipient { id: 1, name: None }],
        );
        assert_eq!(draft.context_code, "course_42");
        assert_eq!(draft.subject, "Haven't Been Graded on Essay 1");
        assert_eq!(draft.recipients.len(), 1);
    }
}
