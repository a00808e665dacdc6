use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseState {
    Available,
    Completed,
    Deleted,
    Unpublished,
}

/// A course the token's user is enrolled in, as returned by `GET /courses`.
///
/// Enrollments restricted by date come back as little more than an id
/// (`{"id": 9, "access_restricted_by_date": true}`), so every display field
/// may be missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub course_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_state: Option<CourseState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollment_term_id: Option<u64>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub access_restricted_by_date: bool,
}
