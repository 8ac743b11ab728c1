use std::time::Duration;

use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{CreateTaskDto, TaskDto};

/// Failure of a single API call. `Display` is what the view shows verbatim.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid task id '{0}'")]
    InvalidTaskId(String),
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("{0}")]
    Transport(String),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Transport("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Transport("Network failure".to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }

    /// Prefers a JSON `message` field from the response body, falling back
    /// to the status line.
    fn from_status(status: StatusCode, body: &str) -> Self {
        #[derive(Deserialize)]
        struct ErrorBody {
            message: String,
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .map(|b| b.message)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| match status.canonical_reason() {
                Some(reason) => format!("{} {}", status.as_u16(), reason),
                None => format!("HTTP {}", status.as_u16()),
            });

        ApiError::Status {
            status: status.as_u16(),
            message,
        }
    }
}

/// Typed client for the task REST API. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiService {
    client: Client,
    base_url: Url,
}

impl ApiService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base = Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "not a base URL".to_string(),
            });
        }
        // Url::join drops the last segment unless the path ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ApiError::from_transport)?;

        Ok(Self {
            client,
            base_url: base,
        })
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    pub async fn list_tasks(&self) -> Result<Vec<TaskDto>, ApiError> {
        let url = self.endpoint("/tasks")?;
        self.send::<Vec<TaskDto>, ()>(Method::GET, url, None).await
    }

    /// `{base}/tasks/{id}` with the id percent-encoded as one path segment.
    pub fn task_endpoint(&self, id: &str) -> Result<Url, ApiError> {
        // url drops "." and ".." segments instead of encoding them
        if id.is_empty() || id == "." || id == ".." {
            return Err(ApiError::InvalidTaskId(id.to_string()));
        }
        let mut url = self.endpoint("/tasks")?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "not a base URL".to_string(),
            })?
            .push(id);
        Ok(url)
    }

    pub async fn get_task(&self, id: &str) -> Result<TaskDto, ApiError> {
        let url = self.task_endpoint(id)?;
        self.send::<TaskDto, ()>(Method::GET, url, None).await
    }

    pub async fn create_task(&self, payload: &CreateTaskDto) -> Result<TaskDto, ApiError> {
        let url = self.endpoint("/tasks")?;
        self.send(Method::POST, url, Some(payload)).await
    }

    async fn send<T, B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        log::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            log::warn!("{} {} failed: {}", method, url, e);
            ApiError::from_transport(e)
        })?;

        let status = response.status();
        let text = response.text().await.map_err(ApiError::from_transport)?;
        log::debug!("{} {} -> {}", method, url, status);

        if !status.is_success() {
            return Err(ApiError::from_status(status, &text));
        }

        serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
