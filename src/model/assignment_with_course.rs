use serde::{Deserialize, Serialize};

use crate::model::assignment::Assignment;

pub const UNKNOWN_COURSE_NAME: &str = "Unknown Course";
pub const UNKNOWN_COURSE_CODE: &str = "N/A";

/// An assignment widened with its owning course's display fields.
///
/// Only exists in response payloads; serialized flat, so clients see the
/// assignment's own fields next to `course_name` and `course_code`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentWithCourse {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub course_name: String,
    pub course_code: String,
}
