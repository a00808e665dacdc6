//! Inbound HTTP handlers.
//!
//! The JSON endpoints only answer GET; every other method gets a 405 before
//! the LMS is contacted. Upstream failures become 500s carrying the upstream
//! error's message.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::PathRejection},
    http::{Method, StatusCode, header::ALLOW},
    response::{Html, IntoResponse, Response},
};
use chrono::Utc;
use tracing::error;

use crate::{
    AppState, aggregate,
    canvas::CanvasError,
    model::{error_body::ErrorBody, simple_response::SimpleResponse},
    view::{self, PageQuery},
};

fn upstream_failure(status: StatusCode, e: CanvasError) -> Response {
    error!("API route error: {e}");
    (status, Json(ErrorBody::new(e.to_string()))).into_response()
}

/// Every assignment of every active course, joined with its course and sorted by due date.
pub async fn get_assignments(State(state): State<Arc<AppState>>) -> Response {
    match aggregate::collect_cycle(&state.canvas).await {
        Ok(cycle) => (StatusCode::OK, Json(cycle.joined())).into_response(),
        Err(e) => upstream_failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

pub async fn get_courses(State(state): State<Arc<AppState>>) -> Response {
    match state.canvas.list_active_courses().await {
        Ok(courses) => (StatusCode::OK, Json(courses)).into_response(),
        Err(e) => upstream_failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

/// A single course; an unknown id is passed through as 404.
pub async fn get_course(
    State(state): State<Arc<AppState>>,
    course_id: Result<Path<u64>, PathRejection>,
) -> Response {
    let Ok(Path(course_id)) = course_id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorBody::new("Course id must be a number")),
        )
            .into_response();
    };

    match state.canvas.get_course(course_id).await {
        Ok(course) => (StatusCode::OK, Json(course)).into_response(),
        Err(
            e @ CanvasError::Http {
                status: StatusCode::NOT_FOUND,
                ..
            },
        ) => upstream_failure(StatusCode::NOT_FOUND, e),
        Err(e) => upstream_failure(StatusCode::INTERNAL_SERVER_ERROR, e),
    }
}

pub async fn method_not_allowed(method: Method) -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(ALLOW, "GET")],
        Json(ErrorBody::new(format!("Method {method} Not Allowed"))),
    )
        .into_response()
}

pub async fn health() -> Json<SimpleResponse> {
    Json(SimpleResponse::ok())
}

/// The HTML dashboard, grouped by course or flat in due-date order.
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Response {
    let (status, page) = match aggregate::collect_cycle(&state.canvas).await {
        Ok(cycle) => (
            StatusCode::OK,
            view::render_page(&cycle.joined(), query.group_by, Utc::now()),
        ),
        Err(e) => {
            error!("Dashboard render failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                view::render_error_page(&e.to_string()),
            )
        }
    };

    match page {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            error!("Template error: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error.").into_response()
        }
    }
}
