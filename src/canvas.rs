//! Client for the Canvas LMS REST API.
//!
//! One [`CanvasClient`] is built at start-up and shared by every handler.
//! Each call is a single authenticated GET against `<base>/api/v1`; there are
//! no retries, and the transport's default timeout applies.

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use crate::config::{API_TOKEN_VAR, API_URL_VAR, CanvasConfig, ConfigError};
use crate::model::assignment::Assignment;
use crate::model::course::Course;

const API_PREFIX: &str = "/api/v1";
const PER_PAGE: u32 = 100;
const RATE_LIMIT_HEADER: &str = "X-Rate-Limit-Remaining";

#[derive(Debug, Error)]
pub enum CanvasError {
    /// Non-2xx answer. `body` is the parsed error document, or `{}` if it was not JSON.
    #[error("Canvas API error: {} {status_text} - {body}", .status.as_u16())]
    Http {
        status: StatusCode,
        status_text: String,
        body: Value,
    },

    #[error("Canvas API request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Canvas API returned an unexpected payload for {endpoint}: {source}")]
    Decode {
        endpoint: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone)]
pub struct CanvasClient {
    base_url: String,
    http: reqwest::Client,
}

impl CanvasClient {
    /// Builds the client, failing immediately on unusable credentials.
    pub fn new(config: &CanvasConfig) -> Result<Self, ConfigError> {
        let api_url = config.api_url.trim().trim_end_matches('/');
        if api_url.is_empty() {
            return Err(ConfigError::MissingVar(API_URL_VAR));
        }
        if config.api_token.trim().is_empty() {
            return Err(ConfigError::MissingVar(API_TOKEN_VAR));
        }

        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_token.trim()))
            .map_err(|_| ConfigError::InvalidToken)?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("dashboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self {
            base_url: format!("{api_url}{API_PREFIX}"),
            http,
        })
    }

    /// Courses the user is actively enrolled in.
    pub async fn list_active_courses(&self) -> Result<Vec<Course>, CanvasError> {
        self.get(&format!(
            "/courses?enrollment_state=active&per_page={PER_PAGE}"
        ))
        .await
    }

    /// Assignments of one course, with the user's submission embedded, ordered by due date.
    pub async fn list_assignments(&self, course_id: u64) -> Result<Vec<Assignment>, CanvasError> {
        self.get(&format!(
            "/courses/{course_id}/assignments?include[]=submission&order_by=due_at&per_page={PER_PAGE}"
        ))
        .await
    }

    pub async fn get_course(&self, course_id: u64) -> Result<Course, CanvasError> {
        self.get(&format!("/courses/{course_id}")).await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, CanvasError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let result = self.fetch(&url, endpoint).await;
        if let Err(e) = &result {
            error!("Canvas API request to {endpoint} failed: {e}");
        }

        result
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str, endpoint: &str) -> Result<T, CanvasError> {
        let response = self.http.get(url).send().await?;

        if let Some(remaining) = response
            .headers()
            .get(RATE_LIMIT_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            debug!("Canvas API rate limit remaining: {remaining}");
        }

        let status = response.status();
        if !status.is_success() {
            // The error body is best effort; anything unreadable becomes `{}`.
            let body = response
                .bytes()
                .await
                .ok()
                .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
                .unwrap_or_else(|| Value::Object(Default::default()));

            return Err(CanvasError::Http {
                status,
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| CanvasError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}
