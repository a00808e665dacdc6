use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::submission::Submission;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingType {
    Points,
    Percent,
    LetterGrade,
    PassFail,
    GpaScale,
    NotGraded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlock_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub points_possible: Option<f64>,
    pub grading_type: GradingType,
    #[serde(default)]
    pub submission_types: Vec<String>,
    pub published: bool,
    pub course_id: u64,
    pub html_url: String,
    #[serde(default)]
    pub locked_for_user: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_submitted_submissions: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission: Option<Submission>,
}

impl Assignment {
    /// Point value worth showing; zero and missing values are suppressed.
    pub fn displayed_points(&self) -> Option<f64> {
        self.points_possible.filter(|p| *p > 0.0)
    }
}
