//! Typed HTTP client for the `/v1/students` API.
//!
//! Plays the part of the browser frontend: CRUD calls, paged listing and the
//! local text filter applied to an already-fetched list.

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub use common::types::{
    CreateStudentInput, PageQuery, PagedResult, SearchTerm, StudentView, UpdateStudentInput,
};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server refused the payload (HTTP 400).
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Clone, Debug)]
pub struct StudentsClient {
    base_url: String,
    http: reqwest::Client,
}

impl StudentsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/students{}", self.base_url, path)
    }

    pub async fn fetch_paged(&self, query: &PageQuery) -> Result<PagedResult<StudentView>, ClientError> {
        let resp = self.http.get(self.url("/paged")).query(query).send().await?;
        match resp.status() {
            StatusCode::OK => Ok(resp.json().await?),
            _ => Err(unexpected(resp).await),
        }
    }

    /// `None` when the server has no student with this id.
    pub async fn fetch_by_id(&self, id: i32) -> Result<Option<StudentView>, ClientError> {
        let resp = self.http.get(self.url(&format!("/{id}"))).send().await?;
        match resp.status() {
            StatusCode::OK => Ok(Some(resp.json().await?)),
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(unexpected(resp).await),
        }
    }

    pub async fn create(&self, payload: &CreateStudentInput) -> Result<StudentView, ClientError> {
        let resp = self.http.post(self.url("")).json(payload).send().await?;
        match resp.status() {
            StatusCode::CREATED => {
                let created: StudentView = resp.json().await?;
                debug!(id = created.id, "student created");
                Ok(created)
            }
            StatusCode::BAD_REQUEST => Err(rejected(resp).await),
            _ => Err(unexpected(resp).await),
        }
    }

    /// `false` when the student does not exist.
    pub async fn update(&self, id: i32, payload: &UpdateStudentInput) -> Result<bool, ClientError> {
        let resp = self.http.put(self.url(&format!("/{id}"))).json(payload).send().await?;
        match resp.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            StatusCode::BAD_REQUEST => Err(rejected(resp).await),
            _ => Err(unexpected(resp).await),
        }
    }

    /// `false` when the student does not exist.
    pub async fn delete(&self, id: i32) -> Result<bool, ClientError> {
        let resp = self.http.delete(self.url(&format!("/{id}"))).send().await?;
        match resp.status() {
            StatusCode::NO_CONTENT | StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(unexpected(resp).await),
        }
    }
}

async fn rejected(resp: Response) -> ClientError {
    let text = resp.text().await.unwrap_or_default();
    let msg = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(ErrorBody { error, detail: Some(d) }) => format!("{error}: {d}"),
        Ok(ErrorBody { error, detail: None }) => error,
        Err(_) => text,
    };
    ClientError::Rejected(msg)
}

async fn unexpected(resp: Response) -> ClientError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    ClientError::Status { status, body }
}

/// Keep the students whose name, email, ra or cpf contains `text`, ignoring
/// case. Blank text keeps everything.
pub fn filter_students(students: &[StudentView], text: &str) -> Vec<StudentView> {
    match SearchTerm::parse(Some(text)) {
        Some(term) => students.iter().filter(|s| s.matches(&term)).cloned().collect(),
        None => students.to_vec(),
    }
}
