//! Fake — test double for Docker operations.
//!
//! Provides a deterministic [`FakeDocker`] that implements [`DockerOps`]
//! using in-memory state, and records every mutating call so tests can
//! assert on the exact sequence dent issued.

use std::collections::{HashMap, HashSet};

use tokio::sync::Mutex;

use crate::client::docker::{DockerFuture, DockerOps};
use crate::docker::inventory::{IMAGE_LABEL, MANAGED_LABEL};
use crate::docker::{ContainerSpec, ContainerStatus, DockerError, ManagedContainer};

// ── In-memory state ─────────────────────────────────────────────

/// A canned container for the fake store.
#[derive(Clone, Debug)]
pub struct FakeContainer {
    pub image: String,
    pub status: ContainerStatus,
    pub labels: HashMap<String, String>,
    /// Paths for which `test -x` succeeds.
    pub executables: Vec<String>,
    /// Status reads left before a restarting container settles.
    pub restarting_polls: u32,
    /// What a restarting container settles into.
    pub settles_to: ContainerStatus,
}

impl FakeContainer {
    pub fn new(image: &str, status: ContainerStatus) -> Self {
        Self {
            image: image.to_string(),
            status,
            labels: HashMap::new(),
            executables: vec!["/bin/sh".to_string()],
            restarting_polls: 0,
            settles_to: ContainerStatus::Running,
        }
    }

    /// Mark the container as created by dent.
    pub fn managed(mut self) -> Self {
        self.labels.insert(MANAGED_LABEL.to_string(), "true".to_string());
        self.labels.insert(IMAGE_LABEL.to_string(), self.image.clone());
        self
    }

    pub fn with_executables(mut self, paths: &[&str]) -> Self {
        self.executables = paths.iter().map(|p| p.to_string()).collect();
        self
    }
}

#[derive(Default)]
struct Inner {
    containers: HashMap<String, FakeContainer>,
    images: HashSet<String>,
    /// References a pull fails for.
    unpullable: HashSet<String>,
    /// Containers removal fails for.
    unremovable: HashSet<String>,
    /// Executables given to containers created through the fake.
    default_executables: Vec<String>,
    calls: Vec<String>,
}

/// A fake Docker client for deterministic testing.
pub struct FakeDocker {
    inner: Mutex<Inner>,
}

impl FakeDocker {
    /// Create an empty fake Docker client.
    pub fn new() -> Self {
        let inner = Inner {
            default_executables: vec!["/bin/bash".to_string(), "/bin/sh".to_string()],
            ..Default::default()
        };
        Self { inner: Mutex::new(inner) }
    }

    /// Seed a container into the fake store.
    pub async fn add_container(&self, name: &str, container: FakeContainer) {
        self.inner.lock().await.containers.insert(name.to_string(), container);
    }

    /// Seed a locally present image.
    pub async fn add_image(&self, reference: &str) {
        self.inner.lock().await.images.insert(reference.to_string());
    }

    /// Make pulls of `reference` fail as if the registry had no such image.
    pub async fn deny_pull(&self, reference: &str) {
        self.inner.lock().await.unpullable.insert(reference.to_string());
    }

    /// Make removal of `name` fail as if the daemon refused it.
    pub async fn deny_remove(&self, name: &str) {
        self.inner.lock().await.unremovable.insert(name.to_string());
    }

    /// Executables present in containers the fake creates.
    pub async fn set_default_executables(&self, paths: &[&str]) {
        self.inner.lock().await.default_executables = paths.iter().map(|p| p.to_string()).collect();
    }

    /// Mutating calls issued so far, e.g. `"start dent-ubuntu"`.
    pub async fn calls(&self) -> Vec<String> {
        self.inner.lock().await.calls.clone()
    }

    /// Current status of a seeded or created container.
    pub async fn status_of(&self, name: &str) -> ContainerStatus {
        self.inner
            .lock()
            .await
            .containers
            .get(name)
            .map(|c| c.status)
            .unwrap_or(ContainerStatus::Missing)
    }
}

impl Default for FakeDocker {
    fn default() -> Self {
        Self::new()
    }
}

fn not_running(name: &str) -> DockerError {
    DockerError::BollardError(bollard::errors::Error::DockerResponseServerError {
        status_code: 409,
        message: format!("Container {} is not running", name),
    })
}

// ── DockerOps implementation ────────────────────────────────────

impl DockerOps for FakeDocker {
    fn container_status<'a>(&'a self, name: &'a str) -> DockerFuture<'a, ContainerStatus> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            let Some(container) = state.containers.get_mut(name) else {
                return Ok(ContainerStatus::Missing);
            };
            if container.status == ContainerStatus::Restarting {
                if container.restarting_polls == 0 {
                    container.status = container.settles_to;
                } else {
                    container.restarting_polls -= 1;
                }
            }
            Ok(container.status)
        })
    }

    fn create_container<'a>(&'a self, spec: &'a ContainerSpec) -> DockerFuture<'a, String> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            if state.containers.contains_key(&spec.name) {
                return Err(DockerError::NameConflict(spec.name.clone()));
            }
            if !state.images.contains(&spec.image) {
                return Err(DockerError::ImageNotFound(spec.image.clone()));
            }
            let container = FakeContainer {
                image: spec.image.clone(),
                status: ContainerStatus::Stopped,
                labels: spec.labels(),
                executables: state.default_executables.clone(),
                restarting_polls: 0,
                settles_to: ContainerStatus::Running,
            };
            state.containers.insert(spec.name.clone(), container);
            state.calls.push(format!("create {} {}", spec.name, spec.image));
            Ok(format!("fake-{}", spec.name))
        })
    }

    fn start_container<'a>(&'a self, name: &'a str) -> DockerFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            let container = state
                .containers
                .get_mut(name)
                .ok_or_else(|| DockerError::ContainerNotFound(name.to_string()))?;
            container.status = ContainerStatus::Running;
            state.calls.push(format!("start {}", name));
            Ok(())
        })
    }

    fn unpause_container<'a>(&'a self, name: &'a str) -> DockerFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            let container = state
                .containers
                .get_mut(name)
                .ok_or_else(|| DockerError::ContainerNotFound(name.to_string()))?;
            if container.status != ContainerStatus::Paused {
                return Err(not_running(name));
            }
            container.status = ContainerStatus::Running;
            state.calls.push(format!("unpause {}", name));
            Ok(())
        })
    }

    fn remove_container<'a>(&'a self, name: &'a str, force: bool) -> DockerFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            let running = state
                .containers
                .get(name)
                .map(|c| c.status == ContainerStatus::Running)
                .ok_or_else(|| DockerError::ContainerNotFound(name.to_string()))?;
            if running && !force {
                return Err(not_running(name));
            }
            if state.unremovable.contains(name) {
                return Err(DockerError::BollardError(
                    bollard::errors::Error::DockerResponseServerError {
                        status_code: 500,
                        message: format!("removal of container {} is already in progress", name),
                    },
                ));
            }
            state.containers.remove(name);
            state.calls.push(format!("remove {}", name));
            Ok(())
        })
    }

    fn list_managed(&self) -> DockerFuture<'_, Vec<ManagedContainer>> {
        Box::pin(async move {
            let state = self.inner.lock().await;
            let mut managed: Vec<ManagedContainer> = state
                .containers
                .iter()
                .map(|(name, c)| ManagedContainer {
                    name: name.clone(),
                    state: c.status.as_str().to_string(),
                    image: c.image.clone(),
                    labels: c.labels.clone(),
                })
                .filter(ManagedContainer::is_managed)
                .collect();
            managed.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(managed)
        })
    }

    fn image_exists<'a>(&'a self, reference: &'a str) -> DockerFuture<'a, bool> {
        Box::pin(async move { Ok(self.inner.lock().await.images.contains(reference)) })
    }

    fn pull_image<'a>(&'a self, reference: &'a str) -> DockerFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            if state.unpullable.contains(reference) {
                return Err(DockerError::ImageNotFound(reference.to_string()));
            }
            state.images.insert(reference.to_string());
            state.calls.push(format!("pull {}", reference));
            Ok(())
        })
    }

    fn run_exec<'a>(&'a self, container: &'a str, cmd: Vec<String>) -> DockerFuture<'a, i64> {
        Box::pin(async move {
            let mut state = self.inner.lock().await;
            let target = state
                .containers
                .get(container)
                .ok_or_else(|| DockerError::ContainerNotFound(container.to_string()))?;
            if target.status != ContainerStatus::Running {
                return Err(not_running(container));
            }
            let code = match cmd.as_slice() {
                [test, flag, path] if test == "test" && flag == "-x" => {
                    if target.executables.iter().any(|e| e == path) { 0 } else { 1 }
                }
                _ => 0,
            };
            state.calls.push(format!("exec {} {}", container, cmd.join(" ")));
            Ok(code)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_restarting_container_settles() {
        let fake = FakeDocker::new();
        let mut c = FakeContainer::new("alpine:latest", ContainerStatus::Restarting);
        c.restarting_polls = 1;
        fake.add_container("box", c).await;

        assert_eq!(fake.container_status("box").await.unwrap(), ContainerStatus::Restarting);
        assert_eq!(fake.container_status("box").await.unwrap(), ContainerStatus::Running);
    }

    #[tokio::test]
    async fn test_remove_can_be_denied() {
        let fake = FakeDocker::new();
        fake.add_container("box", FakeContainer::new("alpine:latest", ContainerStatus::Stopped)).await;
        fake.deny_remove("box").await;
        assert!(fake.remove_container("box", true).await.is_err());
        assert_eq!(fake.status_of("box").await, ContainerStatus::Stopped);
        assert!(fake.calls().await.is_empty());
    }

    #[tokio::test]
    async fn test_create_requires_local_image() {
        let fake = FakeDocker::new();
        let spec = ContainerSpec {
            name: "dent-alpine".to_string(),
            image: "alpine:latest".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            fake.create_container(&spec).await,
            Err(DockerError::ImageNotFound(_))
        ));

        fake.add_image("alpine:latest").await;
        fake.create_container(&spec).await.unwrap();
        assert_eq!(fake.status_of("dent-alpine").await, ContainerStatus::Stopped);
        assert!(matches!(
            fake.create_container(&spec).await,
            Err(DockerError::NameConflict(_))
        ));
    }

    #[tokio::test]
    async fn test_exec_requires_running_container() {
        let fake = FakeDocker::new();
        fake.add_container("box", FakeContainer::new("alpine:latest", ContainerStatus::Stopped)).await;
        assert!(fake.run_exec("box", vec!["true".to_string()]).await.is_err());
    }
}
