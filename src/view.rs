//! Server-rendered dashboard page.
//!
//! The joined assignment list (and the current instant) is turned into plain
//! view structs, which the askama templates under `templates/` render and
//! escape. Due dates are shown in UTC.

use askama::Template;
use chrono::{DateTime, Datelike, TimeDelta, Utc};
use serde::Deserialize;

use crate::model::assignment_with_course::AssignmentWithCourse;
use crate::model::submission::SubmissionState;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Course,
    #[default]
    None,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub group_by: GroupBy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    Overdue,
    DueToday,
    DueTomorrow,
    DueSoon(i64),
}

impl Urgency {
    /// Whole days until the deadline, rounded up. Nothing beyond a week.
    pub fn from_days(days: i64) -> Option<Self> {
        match days {
            d if d < 0 => Some(Urgency::Overdue),
            0 => Some(Urgency::DueToday),
            1 => Some(Urgency::DueTomorrow),
            2..=7 => Some(Urgency::DueSoon(days)),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            Urgency::Overdue => "Overdue".into(),
            Urgency::DueToday => "Due today".into(),
            Urgency::DueTomorrow => "Due tomorrow".into(),
            Urgency::DueSoon(days) => format!("Due in {days} days"),
        }
    }

    fn css_class(&self) -> &'static str {
        match self {
            Urgency::Overdue => "overdue",
            Urgency::DueToday => "today",
            Urgency::DueTomorrow => "tomorrow",
            Urgency::DueSoon(_) => "soon",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueInfo {
    pub date_text: String,
    pub time_text: String,
    pub urgency: Option<Urgency>,
}

/// Days between `now` and `due_at`, rounded towards the future.
pub fn days_until(due_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff: TimeDelta = due_at - now;
    let ms = diff.num_milliseconds();

    ms.div_euclid(DAY_MS) + i64::from(ms.rem_euclid(DAY_MS) != 0)
}

pub fn due_info(due_at: DateTime<Utc>, now: DateTime<Utc>) -> DueInfo {
    let date_text = if due_at.year() == now.year() {
        due_at.format("%b %-d").to_string()
    } else {
        due_at.format("%b %-d, %Y").to_string()
    };

    DueInfo {
        date_text,
        time_text: due_at.format("%-I:%M %p").to_string(),
        urgency: Urgency::from_days(days_until(due_at, now)),
    }
}

/// Course section of the grouped view, in first-encounter order.
#[derive(Debug)]
pub struct CourseGroup<'a> {
    pub course_id: u64,
    pub course_name: &'a str,
    pub course_code: &'a str,
    pub assignments: Vec<&'a AssignmentWithCourse>,
}

pub fn group_by_course(assignments: &[AssignmentWithCourse]) -> Vec<CourseGroup<'_>> {
    let mut groups: Vec<CourseGroup<'_>> = Vec::new();

    for item in assignments {
        let course_id = item.assignment.course_id;
        match groups.iter_mut().find(|g| g.course_id == course_id) {
            Some(group) => group.assignments.push(item),
            None => groups.push(CourseGroup {
                course_id,
                course_name: &item.course_name,
                course_code: &item.course_code,
                assignments: vec![item],
            }),
        }
    }

    groups
}

pub fn points_text(item: &AssignmentWithCourse) -> Option<String> {
    item.assignment
        .displayed_points()
        .map(|points| format!("{points} pts"))
}

pub fn score_text(item: &AssignmentWithCourse) -> Option<String> {
    let submission = item.assignment.submission.as_ref()?;
    if submission.workflow_state != SubmissionState::Graded {
        return None;
    }
    let score = submission.score?;
    let points = item.assignment.points_possible.unwrap_or_default();

    let mut text = format!("Score: {score} / {points}");
    if let Some(grade) = submission.grade.as_deref().filter(|g| !g.is_empty()) {
        text.push_str(&format!(" ({grade})"));
    }
    Some(text)
}

pub fn is_submitted(item: &AssignmentWithCourse) -> bool {
    item.assignment
        .submission
        .as_ref()
        .is_some_and(|s| s.is_turned_in())
}

fn count_text(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("{count} assignment{plural}")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueView {
    /// Urgency label, or the plain date when nothing is pressing.
    pub headline: String,
    pub urgency_class: &'static str,
    pub date_text: String,
    pub time_text: String,
}

/// Everything one assignment card displays.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub course_code: String,
    pub name: String,
    pub html_url: String,
    pub submitted: bool,
    pub due: Option<DueView>,
    pub points: Option<String>,
    pub score: Option<String>,
}

impl CardView {
    pub fn new(item: &AssignmentWithCourse, now: DateTime<Utc>) -> Self {
        let due = item.assignment.due_at.map(|due_at| {
            let info = due_info(due_at, now);
            let (urgency_class, headline) = match info.urgency {
                Some(urgency) => (urgency.css_class(), urgency.label()),
                None => ("", info.date_text.clone()),
            };
            DueView {
                headline,
                urgency_class,
                date_text: info.date_text,
                time_text: info.time_text,
            }
        });

        Self {
            course_code: item.course_code.clone(),
            name: item.assignment.name.clone(),
            html_url: item.assignment.html_url.clone(),
            submitted: is_submitted(item),
            due,
            points: points_text(item),
            score: score_text(item),
        }
    }
}

#[derive(Debug)]
pub struct GroupView {
    pub course_name: String,
    pub course_code: String,
    pub count_text: String,
    pub cards: Vec<CardView>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub has_assignments: bool,
    pub count_text: String,
    pub grouped: bool,
    /// `group_by` value the refresh link keeps.
    pub current: &'static str,
    pub cards: Vec<CardView>,
    pub groups: Vec<GroupView>,
}

impl DashboardPage {
    pub fn new(assignments: &[AssignmentWithCourse], group_by: GroupBy, now: DateTime<Utc>) -> Self {
        let grouped = group_by == GroupBy::Course;

        let (cards, groups) = if grouped {
            let groups = group_by_course(assignments)
                .into_iter()
                .map(|group| GroupView {
                    course_name: group.course_name.to_string(),
                    course_code: group.course_code.to_string(),
                    count_text: count_text(group.assignments.len()),
                    cards: group
                        .assignments
                        .iter()
                        .map(|item| CardView::new(item, now))
                        .collect(),
                })
                .collect();
            (Vec::new(), groups)
        } else {
            let cards = assignments.iter().map(|item| CardView::new(item, now)).collect();
            (cards, Vec::new())
        };

        Self {
            has_assignments: !assignments.is_empty(),
            count_text: count_text(assignments.len()),
            grouped,
            current: if grouped { "course" } else { "none" },
            cards,
            groups,
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub message: String,
}

pub fn render_page(
    assignments: &[AssignmentWithCourse],
    group_by: GroupBy,
    now: DateTime<Utc>,
) -> Result<String, askama::Error> {
    DashboardPage::new(assignments, group_by, now).render()
}

pub fn render_error_page(message: &str) -> Result<String, askama::Error> {
    ErrorPage {
        message: message.to_string(),
    }
    .render()
}
