//! HTTP transport
//!
//! Sends JSON requests to the service and maps HTTP failures onto [`DisError`].
//! Request signing is not performed; requests carry the project ID and, when
//! configured, the security token as headers.

use crate::client::resource::{Resource, ResourcePathBuilder};
use crate::client::retry::BatchSender;
use crate::config::DisConfiguration;
use crate::error::DisError;
use crate::model::{PutRecordsRequestEntry, PutRecordsResult};
use async_trait::async_trait;
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

pub const HTTP_X_PROJECT_ID: &str = "X-Project-Id";
pub const HTTP_X_SECURITY_TOKEN: &str = "X-Security-Token";

/// Which configured endpoint a request goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Records and cursors
    Data,
    /// Streams and transfer tasks
    Manager,
}

/// Body or query string of a request
pub enum Payload<'a, T: Serialize + ?Sized> {
    None,
    Json(&'a T),
    Query(&'a T),
}

/// Error body returned by the service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "errorCode")]
    error_code: Option<String>,
    #[serde(alias = "error_message", alias = "message")]
    error_msg: Option<String>,
}

#[derive(Serialize)]
struct PutRecordsBody<'a> {
    stream_name: &'a str,
    records: &'a [PutRecordsRequestEntry],
}

/// JSON-over-HTTP transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: Arc<DisConfiguration>,
}

impl HttpTransport {
    /// Create a transport for `config`
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the HTTP client can not be built.
    pub fn new(config: Arc<DisConfiguration>) -> Result<Self, DisError> {
        let client = reqwest::Client::builder().build().map_err(|e| {
            DisError::ConfigurationError(format!("Failed to create HTTP client: {}", e))
        })?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, kind: EndpointKind) -> &str {
        match kind {
            EndpointKind::Data => &self.config.endpoint,
            EndpointKind::Manager => self.config.effective_manager_endpoint(),
        }
    }

    /// Send one request and decode the response body
    ///
    /// An empty success body decodes as `{}`.
    ///
    /// # Errors
    ///
    /// - `ConnectionError` if the request could not be sent or the body read
    /// - `AuthenticationError` on HTTP 401/403
    /// - `ServiceError` on any other non-success status
    /// - `SerializationError` if the body does not decode into `Resp`
    pub async fn request<Req, Resp>(
        &self,
        method: Method,
        kind: EndpointKind,
        resources: Vec<Resource>,
        payload: Payload<'_, Req>,
    ) -> Result<Resp, DisError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let path = resources
            .into_iter()
            .fold(
                ResourcePathBuilder::standard().with_project_id(&self.config.project_id),
                ResourcePathBuilder::with_resource,
            )
            .build()?;
        let url = path.to_url(self.endpoint(kind))?;

        debug!("{} {}", method, url);

        let mut builder = self
            .client
            .request(method, url)
            .header(HTTP_X_PROJECT_ID, &self.config.project_id);

        if let Some(token) = &self.config.security_token {
            let token = token.expose_secret();
            if !token.is_empty() {
                builder = builder.header(HTTP_X_SECURITY_TOKEN, token.as_str());
            }
        }

        builder = match payload {
            Payload::None => builder,
            Payload::Json(body) => builder.json(body),
            Payload::Query(query) => builder.query(query),
        };

        let response = builder.send().await.map_err(|e| {
            DisError::ConnectionError(format!("Failed to send request to {}: {}", path, e))
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            DisError::ConnectionError(format!("Failed to read response from {}: {}", path, e))
        })?;

        if !status.is_success() {
            warn!("Request to {} failed with status {}: {}", path, status, text);
            return Err(status_error(status, text));
        }

        let body = if text.trim().is_empty() { "{}" } else { text.as_str() };
        serde_json::from_str(body).map_err(|e| {
            DisError::SerializationError(format!(
                "Failed to parse response from {}: {}",
                path, e
            ))
        })
    }
}

fn status_error(status: reqwest::StatusCode, text: String) -> DisError {
    let parsed: Option<ErrorBody> = serde_json::from_str(&text).ok();
    let (error_code, message) = match parsed {
        Some(body) => (body.error_code, body.error_msg.unwrap_or_else(|| text.clone())),
        None => (None, text),
    };

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return DisError::AuthenticationError(format!("HTTP {}: {}", status.as_u16(), message));
    }

    DisError::ServiceError {
        status: status.as_u16(),
        error_code,
        message,
    }
}

#[async_trait]
impl BatchSender for HttpTransport {
    async fn send(
        &self,
        stream_name: &str,
        records: &[PutRecordsRequestEntry],
    ) -> Result<PutRecordsResult, DisError> {
        let body = PutRecordsBody {
            stream_name,
            records,
        };
        self.request(
            Method::POST,
            EndpointKind::Data,
            vec![Resource::Records],
            Payload::Json(&body),
        )
        .await
    }
}
