//! Resource path construction
//!
//! Every API path is `/v2/{project_id}/` followed by one or more resources,
//! e.g. `/v2/{project_id}/streams/{stream_name}/transfer-tasks`.

use crate::error::DisError;
use std::fmt;
use url::Url;

const API_VERSION: &str = "v2";

/// One resource of a path, optionally addressing a single instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    Records,
    Cursors,
    Streams(Option<String>),
    TransferTasks(Option<String>),
}

impl Resource {
    fn push_segments(&self, segments: &mut Vec<String>) {
        let (collection, id) = match self {
            Resource::Records => ("records", None),
            Resource::Cursors => ("cursors", None),
            Resource::Streams(id) => ("streams", id.as_ref()),
            Resource::TransferTasks(id) => ("transfer-tasks", id.as_ref()),
        };
        segments.push(collection.to_string());
        if let Some(id) = id {
            segments.push(id.clone());
        }
    }
}

/// Builder for [`ResourcePath`]
#[derive(Debug, Clone, Default)]
pub struct ResourcePathBuilder {
    project_id: Option<String>,
    resources: Vec<Resource>,
}

impl ResourcePathBuilder {
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.push(resource);
        self
    }

    /// Build the path
    ///
    /// # Errors
    ///
    /// Returns `InvalidRequest` if the project ID is missing or empty, no resource
    /// was added, or an instance name is empty.
    pub fn build(self) -> Result<ResourcePath, DisError> {
        let project_id = self
            .project_id
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DisError::InvalidRequest("project id can not be empty".to_string()))?;

        if self.resources.is_empty() {
            return Err(DisError::InvalidRequest(
                "resource path needs at least one resource".to_string(),
            ));
        }

        let mut segments = vec![API_VERSION.to_string(), project_id];
        for resource in &self.resources {
            resource.push_segments(&mut segments);
        }

        if segments.iter().any(|s| s.is_empty()) {
            return Err(DisError::InvalidRequest(
                "resource names can not be empty".to_string(),
            ));
        }

        Ok(ResourcePath { segments })
    }
}

/// Built path, kept as raw segments so they are percent-encoded when joined
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// Full URL of this path under `endpoint`
    ///
    /// Any path already present on the endpoint is kept as a prefix.
    pub fn to_url(&self, endpoint: &str) -> Result<Url, DisError> {
        let mut url = Url::parse(endpoint.trim()).map_err(|e| {
            DisError::ConfigurationError(format!("invalid endpoint '{}': {}", endpoint, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                DisError::ConfigurationError(format!("endpoint '{}' can not be a base", endpoint))
            })?
            .pop_if_empty()
            .extend(&self.segments);
        Ok(url)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
