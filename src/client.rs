use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{NewTask, Task, TaskPatch};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned {status}: {message}")]
    Api {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

/// HTTP client for the task service.
#[derive(Debug, Clone)]
pub struct TaskClient {
    http: reqwest::Client,
    base_url: String,
}

impl TaskClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch all tasks, optionally only those in `category`
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<Task>, ClientError> {
        let mut request = self.http.get(self.url("/tasks"));
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            request = request.query(&[("category", category)]);
        }
        Self::decode(request.send().await?).await
    }

    pub async fn create(&self, input: &NewTask) -> Result<Task, ClientError> {
        let request = self.http.post(self.url("/tasks")).json(input);
        Self::decode(request.send().await?).await
    }

    /// Update a task in place
    pub async fn replace(&self, id: &str, patch: &TaskPatch) -> Result<Task, ClientError> {
        let request = self.http.put(self.url(&format!("/tasks/{}", id))).json(patch);
        Self::decode(request.send().await?).await
    }

    pub async fn complete(&self, id: &str) -> Result<Task, ClientError> {
        self.send_empty(Method::PUT, &format!("/tasks/{}/complete", id)).await
    }

    pub async fn delete(&self, id: &str) -> Result<Task, ClientError> {
        self.send_empty(Method::DELETE, &format!("/tasks/{}", id)).await
    }

    async fn send_empty<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, ClientError> {
        let response = self.http.request(method, self.url(path)).send().await?;
        Self::decode(response).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        // Error bodies are JSON from our server but may be anything from a proxy
        let text = response.text().await.unwrap_or_default();
        let (code, message) = match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => (body.code, body.message.unwrap_or_else(|| text.clone())),
            Err(_) => (None, text),
        };
        let message = if message.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            message
        };
        Err(ClientError::Api { status, code, message })
    }
}
