//! HTTP implementation of [`TaskRemote`].
//!
//! Talks JSON to the task-storage service:
//!
//! | call | request |
//! |---|---|
//! | list | `GET {base}/tasks` |
//! | create | `POST {base}/tasks` |
//! | update status | `PUT {base}/tasks/{id}` |
//! | delete | `DELETE {base}/tasks/{id}` |
//!
//! Responses are classified by their JSON envelope, not by HTTP status: a
//! 404 carrying `{"success": false}` is a rejection, while a 200 with a
//! body that is not an envelope is a transport failure.

use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use taskdeck_proto::{
    AckResponse, ListResponse, NewTask, StatusUpdate, Task, TaskId, TaskResponse, TaskStatus,
};
use url::Url;

use super::{RemoteError, TaskRemote};

/// Connection settings for [`HttpRemote`].
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    /// Base URL of the service; task paths are appended to it.
    pub base_url: String,
    /// Upper bound on a whole request/response exchange.
    pub request_timeout: Duration,
    /// Upper bound on establishing the TCP/TLS connection.
    pub connect_timeout: Duration,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Task-storage client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpRemote {
    /// Build a client for the service at `settings.base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::Unavailable`] if the base URL is not a valid
    /// `http`/`https` URL, or [`RemoteError::Http`] if the HTTP client
    /// cannot be constructed.
    pub fn new(settings: &RemoteSettings) -> Result<Self, RemoteError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| RemoteError::Unavailable(format!("invalid base URL: {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(RemoteError::Unavailable(format!(
                "unsupported base URL: {base_url}"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(RemoteError::Http)?;

        Ok(Self { base_url, client })
    }

    /// The service base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds `{base}/tasks` or `{base}/tasks/{id}` with the id percent-encoded
    /// as a single path segment.
    fn endpoint(&self, id: Option<&TaskId>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("tasks");
            if let Some(id) = id {
                segments.push(&id.as_text());
            }
        }
        url
    }

    fn request(&self, method: Method, id: Option<&TaskId>) -> RequestBuilder {
        self.client.request(method, self.endpoint(id))
    }

    /// Sends a request and decodes the body as envelope `T`, whatever the
    /// HTTP status.
    async fn exchange<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, RemoteError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.bytes().await?;

        tracing::debug!(%url, %status, bytes = body.len(), "task service responded");

        serde_json::from_slice(&body)
            .map_err(|e| RemoteError::Malformed(format!("HTTP {status} from {url}: {e}")))
    }
}

impl TaskRemote for HttpRemote {
    async fn list(&self) -> Result<Vec<Task>, RemoteError> {
        let envelope: ListResponse = self.exchange(self.request(Method::GET, None)).await?;
        Ok(envelope.into_result()?)
    }

    async fn create(&self, new_task: &NewTask) -> Result<Task, RemoteError> {
        let request = self.request(Method::POST, None).json(new_task);
        let envelope: TaskResponse = self.exchange(request).await?;
        Ok(envelope.into_result()?)
    }

    async fn update_status(&self, id: &TaskId, status: TaskStatus) -> Result<Task, RemoteError> {
        let request = self
            .request(Method::PUT, Some(id))
            .json(&StatusUpdate { status });
        let envelope: TaskResponse = self.exchange(request).await?;
        Ok(envelope.into_result()?)
    }

    async fn delete(&self, id: &TaskId) -> Result<(), RemoteError> {
        let envelope: AckResponse = self.exchange(self.request(Method::DELETE, Some(id))).await?;
        Ok(envelope.into_result()?)
    }
}
