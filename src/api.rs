//! REST client for the Ficous exercises backend.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::model::{ExerciseDetail, ExerciseFilters, ExerciseGradeIn, ExerciseGradeOut, ExerciseSummary};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// The backend operations the quiz needs. Implemented by [`FicousClient`]
/// and by in-memory fakes in tests.
#[async_trait]
pub trait ExerciseApi: Send + Sync {
    async fn get_exercise_detail(&self, exercise_id: &str) -> Result<ExerciseDetail, ApiError>;

    async fn grade_exercise(
        &self,
        exercise_id: &str,
        body: &ExerciseGradeIn,
    ) -> Result<ExerciseGradeOut, ApiError>;

    async fn list_exercises(
        &self,
        filters: &ExerciseFilters,
    ) -> Result<Vec<ExerciseSummary>, ApiError>;
}

/// HTTP client for `/ficous/exercises/*`.
///
/// Note: Debug masks the bearer token.
#[derive(Clone)]
pub struct FicousClient {
    base_url: String,
    token: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl fmt::Debug for FicousClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FicousClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl FicousClient {
    pub fn new(base_url: &str, token: Option<String>, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.is_empty()),
            timeout_secs,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: reqwest::Method, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%method, %url, "ficous request");
        let builder = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder) -> Result<T, ApiError> {
        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout_secs)
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(status, &body);
            return Err(match status {
                401 | 403 => ApiError::Unauthorized(message),
                404 => ApiError::NotFound(message),
                _ => ApiError::Status { status, message },
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Pull a human message out of an error body: `message`, then FastAPI's
/// `detail`, then the bare status.
fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("message")
                .or_else(|| v.get("detail"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("HTTP {status}"))
}

#[async_trait]
impl ExerciseApi for FicousClient {
    #[instrument(skip(self))]
    async fn get_exercise_detail(&self, exercise_id: &str) -> Result<ExerciseDetail, ApiError> {
        let builder = self.request(
            reqwest::Method::GET,
            &format!("/ficous/exercises/{exercise_id}"),
        );
        self.send(builder).await
    }

    #[instrument(skip(self, body), fields(answers = body.answers_json.len()))]
    async fn grade_exercise(
        &self,
        exercise_id: &str,
        body: &ExerciseGradeIn,
    ) -> Result<ExerciseGradeOut, ApiError> {
        let builder = self
            .request(
                reqwest::Method::POST,
                &format!("/ficous/exercises/{exercise_id}/grade"),
            )
            .json(body);
        self.send(builder).await
    }

    #[instrument(skip(self))]
    async fn list_exercises(
        &self,
        filters: &ExerciseFilters,
    ) -> Result<Vec<ExerciseSummary>, ApiError> {
        let builder = self
            .request(reqwest::Method::GET, "/ficous/exercises/")
            .query(filters);
        self.send(builder).await
    }
}
