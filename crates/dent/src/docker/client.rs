//! Docker client — connection setup and error classification.
//!
//! Domain methods live in sibling modules (`container`, `image`, `shell`)
//! which add `impl DockerClient` blocks.

use bollard::Docker;
use thiserror::Error;

/// Seconds bollard waits on a single daemon request.
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Error, Debug)]
pub enum DockerError {
    #[error("Docker connection failed: {0}")]
    ConnectionFailed(String),
    #[error("No such container: {0}")]
    ContainerNotFound(String),
    #[error("No such image: {0}")]
    ImageNotFound(String),
    #[error("Container name already in use: {0}")]
    NameConflict(String),
    #[error("Permission denied talking to the Docker daemon")]
    PermissionDenied,
    #[error("Docker error: {0}")]
    BollardError(#[from] bollard::errors::Error),
}

impl DockerError {
    /// Map a bollard error for an operation on a named container.
    pub(super) fn for_container(name: &str, err: bollard::errors::Error) -> Self {
        match err {
            bollard::errors::Error::DockerResponseServerError { status_code: 404, .. } => {
                DockerError::ContainerNotFound(name.to_string())
            }
            bollard::errors::Error::DockerResponseServerError { status_code: 409, .. } => {
                DockerError::NameConflict(name.to_string())
            }
            bollard::errors::Error::DockerResponseServerError { status_code: 403, .. } => {
                DockerError::PermissionDenied
            }
            other => DockerError::BollardError(other),
        }
    }

    /// Map a bollard error for an operation on an image reference.
    pub(super) fn for_image(reference: &str, err: bollard::errors::Error) -> Self {
        match err {
            bollard::errors::Error::DockerResponseServerError { status_code: 404, .. } => {
                DockerError::ImageNotFound(reference.to_string())
            }
            other => DockerError::BollardError(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DockerClient {
    /// The bollard Docker client.  `pub(super)` so that domain modules
    /// in sibling files can call bollard APIs directly.
    pub(super) client: Docker,
}

impl DockerClient {
    /// Connect to the daemon at `host`.
    ///
    /// Accepts an empty string (bollard defaults, honouring `DOCKER_HOST`),
    /// a bare socket path, `unix://…`, or `tcp://…`/`http://…`.
    pub fn new(host: &str) -> Result<Self, DockerError> {
        let connection = if host.is_empty() {
            Docker::connect_with_defaults()
        } else if host.starts_with("tcp://") || host.starts_with("http://") {
            Docker::connect_with_http(host, REQUEST_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
        } else {
            let clean_path = host.trim_start_matches("unix://");
            Docker::connect_with_socket(clean_path, REQUEST_TIMEOUT_SECS, bollard::API_DEFAULT_VERSION)
        }
        .map_err(|e| DockerError::ConnectionFailed(e.to_string()))?;

        Ok(DockerClient { client: connection })
    }

    /// Check that the daemon answers `/_ping`.
    pub async fn ping(&self) -> Result<(), DockerError> {
        self.client
            .ping()
            .await
            .map(|_| ())
            .map_err(|e| DockerError::ConnectionFailed(e.to_string()))
    }
}

/// The `DOCKER_HOST` value the Docker CLI needs to reach the same daemon,
/// or `None` when the CLI should use its own defaults.
pub fn cli_docker_host(host: &str) -> Option<String> {
    if host.is_empty() {
        None
    } else if host.contains("://") {
        Some(host.to_string())
    } else {
        Some(format!("unix://{}", host))
    }
}
