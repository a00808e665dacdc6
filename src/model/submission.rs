use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    Submitted,
    Unsubmitted,
    Graded,
    PendingReview,
}

/// The current user's submission, embedded through `include[]=submission`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub grade: Option<String>,
    pub workflow_state: SubmissionState,
}

impl Submission {
    /// Graded work counts as handed in.
    pub fn is_turned_in(&self) -> bool {
        matches!(
            self.workflow_state,
            SubmissionState::Submitted | SubmissionState::Graded
        )
    }
}
