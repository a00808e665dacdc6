//! One aggregation cycle: courses, then every course's assignments at once.
//!
//! The course list is mandatory and its failure fails the cycle. A single
//! course's assignment fetch is not: it is logged and the course contributes
//! nothing, so one broken course cannot blank the whole dashboard. As a
//! consequence an empty result can also mean "every course failed".

use std::cmp::Ordering;
use std::collections::HashMap;

use futures::future::join_all;
use tracing::{info, warn};

use crate::canvas::{CanvasClient, CanvasError};
use crate::model::assignment::Assignment;
use crate::model::assignment_with_course::{
    AssignmentWithCourse, UNKNOWN_COURSE_CODE, UNKNOWN_COURSE_NAME,
};
use crate::model::course::Course;

/// Everything fetched during one cycle.
#[derive(Debug, Clone)]
pub struct Cycle {
    pub courses: Vec<Course>,
    /// Sorted by due date, undated last.
    pub assignments: Vec<Assignment>,
}

impl Cycle {
    pub fn joined(&self) -> Vec<AssignmentWithCourse> {
        join_courses(self.assignments.clone(), &self.courses)
    }
}

/// Assignments across every active course, sorted by due date.
pub async fn get_all_assignments(client: &CanvasClient) -> Result<Vec<Assignment>, CanvasError> {
    collect_cycle(client).await.map(|cycle| cycle.assignments)
}

pub async fn collect_cycle(client: &CanvasClient) -> Result<Cycle, CanvasError> {
    let courses = client.list_active_courses().await?;

    // Unbounded fan-out: one request per enrolled course.
    let fetches = courses.iter().map(|course| async move {
        match client.list_assignments(course.id).await {
            Ok(assignments) => assignments,
            Err(e) => {
                warn!("Failed to fetch assignments for course {}: {e}", course.id);
                Vec::new()
            }
        }
    });

    let mut assignments: Vec<Assignment> = join_all(fetches).await.into_iter().flatten().collect();
    sort_by_due_date(&mut assignments);

    info!(
        "Aggregated {} assignments across {} courses",
        assignments.len(),
        courses.len()
    );

    Ok(Cycle {
        courses,
        assignments,
    })
}

/// Ascending by due instant; assignments without a due date go last, in encounter order.
pub fn sort_by_due_date(assignments: &mut [Assignment]) {
    assignments.sort_by(|a, b| match (a.due_at, b.due_at) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

/// Attaches course name and code, falling back to sentinels for unknown
/// course ids and for courses whose name or code came back blank.
pub fn join_courses(assignments: Vec<Assignment>, courses: &[Course]) -> Vec<AssignmentWithCourse> {
    let by_id: HashMap<u64, &Course> = courses.iter().map(|c| (c.id, c)).collect();

    assignments
        .into_iter()
        .map(|assignment| {
            let course = by_id.get(&assignment.course_id);
            let course_name = course
                .map(|c| c.name.as_str())
                .filter(|name| !name.is_empty())
                .unwrap_or(UNKNOWN_COURSE_NAME)
                .to_string();
            let course_code = course
                .map(|c| c.course_code.as_str())
                .filter(|code| !code.is_empty())
                .unwrap_or(UNKNOWN_COURSE_CODE)
                .to_string();

            AssignmentWithCourse {
                assignment,
                course_name,
                course_code,
            }
        })
        .collect()
}
