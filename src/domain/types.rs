use serde::{Deserialize, Serialize};

pub const CUSTOM_STATUS_ICON: &str = "ic_flag";
pub const CUSTOM_STATUS_COLOR: &str = "textInfo";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum GradingType {
    #[default]
    Points,
    #[serde(alias = "percentage")]
    Percent,
    PassFail,
    LetterGrade,
    GpaScale,
    NotGraded,
}

impl GradingType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::Percent => "percent",
            Self::PassFail => "pass_fail",
            Self::LetterGrade => "letter_grade",
            Self::GpaScale => "gpa_scale",
            Self::NotGraded => "not_graded",
        }
    }
}

/// Status badge attached to a submission row. A row may carry several
/// (`Late` + `NeedsGrading`), in the order they are displayed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubmissionTag {
    Late,
    Missing,
    Submitted,
    Graded,
    Excused,
    NotSubmitted,
    NeedsGrading,
    Custom { label: String, icon: String, color: String },
}

impl SubmissionTag {
    pub fn custom(label: impl Into<String>) -> Self {
        Self::Custom {
            label: label.into(),
            icon: CUSTOM_STATUS_ICON.to_string(),
            color: CUSTOM_STATUS_COLOR.to_string(),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom { .. })
    }

    /// Final grading states: the row needs no further grading action.
    pub fn is_graded_state(&self) -> bool {
        matches!(self, Self::Graded | Self::Excused | Self::Custom { .. })
    }

    /// States that still await a grade from the instructor.
    pub fn is_pending_state(&self) -> bool {
        matches!(self, Self::Late | Self::Submitted | Self::Missing | Self::NeedsGrading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grading_type_accepts_percentage_alias() {
        let parsed: GradingType = serde_json::from_str("\"percentage\"").expect("alias");
        assert_eq!(parsed, GradingType::Percent);
        let parsed: GradingType = serde_json::from_str("\"percent\"").expect("canonical");
        assert_eq!(parsed, GradingType::Percent);
        assert_eq!(GradingType::PassFail.as_str(), "pass_fail");
    }

    #[test]
    fn custom_tag_serializes_with_kind() {
        let value = serde_json::to_value(SubmissionTag::custom("Absent")).expect("serialize");
        assert_eq!(value["kind"], "custom");
        assert_eq!(value["label"], "Absent");
        assert_eq!(value["icon"], CUSTOM_STATUS_ICON);
        assert_eq!(value["color"], CUSTOM_STATUS_COLOR);

        let value = serde_json::to_value(SubmissionTag::NeedsGrading).expect("serialize");
        assert_eq!(value["kind"], "needs_grading");
    }
}
