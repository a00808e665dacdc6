//! A fake Canvas LMS served on an ephemeral local port.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Request, State};
use axum::http::{HeaderName, StatusCode};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Json;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::canvas::CanvasClient;
use crate::config::CanvasConfig;

pub const TEST_TOKEN: &str = "test-token";

pub fn course_json(id: u64, name: &str, code: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "course_code": code,
        "workflow_state": "available",
        "enrollment_term_id": 1
    })
}

pub fn assignment_json(id: u64, course_id: u64, due_at: Option<&str>) -> Value {
    json!({
        "id": id,
        "name": format!("Assignment {id}"),
        "description": null,
        "due_at": due_at,
        "points_possible": 10.0,
        "grading_type": "points",
        "submission_types": ["online_text_entry"],
        "published": true,
        "course_id": course_id,
        "html_url": format!("https://canvas.example.edu/courses/{course_id}/assignments/{id}"),
        "locked_for_user": false,
        "submission": {
            "submitted_at": null,
            "score": null,
            "grade": null,
            "workflow_state": "unsubmitted"
        }
    })
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub uri: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Default)]
pub struct FakeCanvas {
    courses: Vec<Value>,
    raw_course_list: Option<Value>,
    assignments: HashMap<u64, Vec<Value>>,
    failing: HashSet<u64>,
    course_list_status: Option<StatusCode>,
}

struct Shared {
    fake: FakeCanvas,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct FakeHandle {
    base_url: String,
    shared: Arc<Shared>,
}

impl FakeCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn course(mut self, course: Value) -> Self {
        self.courses.push(course);
        self
    }

    /// Served verbatim as the course list, bypassing [`FakeCanvas::course`].
    pub fn raw_course_list(mut self, body: Value) -> Self {
        self.raw_course_list = Some(body);
        self
    }

    /// Files the assignment under its own `course_id`.
    pub fn assignment(self, assignment: Value) -> Self {
        let course_id = assignment["course_id"].as_u64().unwrap_or_default();
        self.assignment_in(course_id, assignment)
    }

    /// Serves the assignment from `course_id`'s list whatever its own `course_id` says.
    pub fn assignment_in(mut self, course_id: u64, assignment: Value) -> Self {
        self.assignments.entry(course_id).or_default().push(assignment);
        self
    }

    /// Assignment requests for this course answer 500 with a non-JSON body.
    pub fn failing_course(mut self, course_id: u64) -> Self {
        self.failing.insert(course_id);
        self
    }

    pub fn course_list_status(mut self, status: StatusCode) -> Self {
        self.course_list_status = Some(status);
        self
    }

    pub async fn spawn(self) -> FakeHandle {
        let shared = Arc::new(Shared {
            fake: self,
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route("/api/v1/courses", get(list_courses))
            .route("/api/v1/courses/{course_id}", get(get_course))
            .route("/api/v1/courses/{course_id}/assignments", get(list_assignments))
            .layer(from_fn_with_state(shared.clone(), record))
            .with_state(shared.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeHandle {
            base_url: format!("http://{addr}"),
            shared,
        }
    }
}

impl FakeHandle {
    pub fn config(&self) -> CanvasConfig {
        CanvasConfig {
            api_url: self.base_url.clone(),
            api_token: TEST_TOKEN.into(),
        }
    }

    pub fn client(&self) -> CanvasClient {
        CanvasClient::new(&self.config()).unwrap()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests.lock().unwrap().clone()
    }
}

async fn record(State(shared): State<Arc<Shared>>, req: Request, next: Next) -> Response {
    // Built in its own scope so no borrow of `req` lives across the await.
    let recorded = {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        RecordedRequest {
            uri: req.uri().to_string(),
            authorization: header(AUTHORIZATION),
            content_type: header(CONTENT_TYPE),
        }
    };
    shared.requests.lock().unwrap().push(recorded);

    next.run(req).await
}

async fn list_courses(State(shared): State<Arc<Shared>>) -> Response {
    if let Some(status) = shared.fake.course_list_status {
        return (
            status,
            Json(json!({"errors": [{"message": "Invalid access token."}]})),
        )
            .into_response();
    }

    match &shared.fake.raw_course_list {
        Some(raw) => Json(raw.clone()).into_response(),
        None => Json(shared.fake.courses.clone()).into_response(),
    }
}

async fn get_course(State(shared): State<Arc<Shared>>, Path(course_id): Path<u64>) -> Response {
    match shared
        .fake
        .courses
        .iter()
        .find(|c| c["id"].as_u64() == Some(course_id))
    {
        Some(course) => Json(course.clone()).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"errors": [{"message": "The specified resource does not exist."}]})),
        )
            .into_response(),
    }
}

async fn list_assignments(
    State(shared): State<Arc<Shared>>,
    Path(course_id): Path<u64>,
) -> Response {
    if shared.fake.failing.contains(&course_id) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response();
    }

    let assignments = shared
        .fake
        .assignments
        .get(&course_id)
        .cloned()
        .unwrap_or_default();
    Json(assignments).into_response()
}
