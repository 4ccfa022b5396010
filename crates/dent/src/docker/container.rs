//! Container domain — inspect, create, lifecycle, listing.

use super::client::{DockerClient, DockerError};
use super::inventory::{ContainerStatus, ManagedContainer, IMAGE_LABEL, MANAGED_LABEL};

use bollard::models::{ContainerCreateBody, HostConfig};
use bollard::query_parameters::{CreateContainerOptions, ListContainersOptions, RemoveContainerOptions};
use std::collections::HashMap;

/// Everything needed to create a container dent can later enter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    /// Long-running command that keeps the container alive between sessions.
    pub keepalive: Vec<String>,
    pub working_dir: Option<String>,
    pub env: Vec<String>,
    pub binds: Vec<String>,
}

impl ContainerSpec {
    /// Labels that mark the container as created by dent.
    pub fn labels(&self) -> HashMap<String, String> {
        let mut labels = HashMap::new();
        labels.insert(MANAGED_LABEL.to_string(), "true".to_string());
        labels.insert(IMAGE_LABEL.to_string(), self.image.clone());
        labels
    }

    fn into_body(self) -> ContainerCreateBody {
        let labels = self.labels();
        ContainerCreateBody {
            image: Some(self.image),
            cmd: if self.keepalive.is_empty() { None } else { Some(self.keepalive) },
            hostname: Some(self.name),
            // A TTY with stdin held open keeps a plain shell idling forever.
            tty: Some(true),
            open_stdin: Some(true),
            working_dir: self.working_dir,
            env: if self.env.is_empty() { None } else { Some(self.env) },
            labels: Some(labels),
            host_config: Some(HostConfig {
                binds: if self.binds.is_empty() { None } else { Some(self.binds) },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

impl DockerClient {
    /// Inspect a container and classify its state; a 404 is `Missing`.
    pub async fn container_status(&self, name: &str) -> Result<ContainerStatus, DockerError> {
        match self.client.inspect_container(name, None).await {
            Ok(details) => Ok(ContainerStatus::from(&details)),
            Err(bollard::errors::Error::DockerResponseServerError { status_code: 404, .. }) => {
                Ok(ContainerStatus::Missing)
            }
            Err(e) => Err(DockerError::for_container(name, e)),
        }
    }

    /// Create a container from `spec`. Returns the new container ID.
    pub async fn create_container(&self, spec: &ContainerSpec) -> Result<String, DockerError> {
        let name = spec.name.clone();
        let options = Some(CreateContainerOptions {
            name: Some(name.clone()),
            ..Default::default()
        });

        let response = self
            .client
            .create_container(options, spec.clone().into_body())
            .await
            .map_err(|e| match e {
                bollard::errors::Error::DockerResponseServerError { status_code: 404, .. } => {
                    DockerError::ImageNotFound(spec.image.clone())
                }
                other => DockerError::for_container(&name, other),
            })?;

        for warning in &response.warnings {
            tracing::warn!(container = %name, "{}", warning);
        }
        Ok(response.id)
    }

    /// Start a stopped container.
    pub async fn start_container(&self, name: &str) -> Result<(), DockerError> {
        self.client
            .start_container(name, None)
            .await
            .map_err(|e| DockerError::for_container(name, e))
    }

    /// Unpause a paused container.
    pub async fn unpause_container(&self, name: &str) -> Result<(), DockerError> {
        self.client
            .unpause_container(name)
            .await
            .map_err(|e| DockerError::for_container(name, e))
    }

    /// Remove a container. If `force` is true, the container will be killed first.
    pub async fn remove_container(&self, name: &str, force: bool) -> Result<(), DockerError> {
        let options = Some(RemoveContainerOptions {
            force,
            ..Default::default()
        });

        self.client
            .remove_container(name, options)
            .await
            .map_err(|e| DockerError::for_container(name, e))
    }

    /// All containers carrying the dent label, running or not, sorted by name.
    pub async fn list_managed(&self) -> Result<Vec<ManagedContainer>, DockerError> {
        let options = Some(ListContainersOptions {
            all: true,
            ..Default::default()
        });
        let containers = self.client.list_containers(options).await?;
        let mut managed: Vec<ManagedContainer> = containers
            .into_iter()
            .map(ManagedContainer::from)
            .filter(ManagedContainer::is_managed)
            .collect();
        managed.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(managed)
    }
}
