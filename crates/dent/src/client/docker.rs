//! Docker trait — abstract interface for the Docker operations dent needs.
//!
//! `live.rs` provides the real Bollard-backed implementation.
//! `fake.rs` provides a test double.

use std::future::Future;
use std::pin::Pin;

use crate::docker::{ContainerSpec, ContainerStatus, DockerError, ManagedContainer};

pub type DockerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, DockerError>> + Send + 'a>>;

/// Async interface over the Docker daemon.
///
/// Object-safe thanks to boxed futures, so `enter` can take `&dyn DockerOps`.
pub trait DockerOps: Send + Sync {
    // ── Containers ──────────────────────────────────────────────

    fn container_status<'a>(&'a self, name: &'a str) -> DockerFuture<'a, ContainerStatus>;

    fn create_container<'a>(&'a self, spec: &'a ContainerSpec) -> DockerFuture<'a, String>;

    fn start_container<'a>(&'a self, name: &'a str) -> DockerFuture<'a, ()>;

    fn unpause_container<'a>(&'a self, name: &'a str) -> DockerFuture<'a, ()>;

    fn remove_container<'a>(&'a self, name: &'a str, force: bool) -> DockerFuture<'a, ()>;

    fn list_managed(&self) -> DockerFuture<'_, Vec<ManagedContainer>>;

    // ── Images ──────────────────────────────────────────────────

    fn image_exists<'a>(&'a self, reference: &'a str) -> DockerFuture<'a, bool>;

    fn pull_image<'a>(&'a self, reference: &'a str) -> DockerFuture<'a, ()>;

    // ── Exec ────────────────────────────────────────────────────

    /// Run a command without a TTY and return its exit code.
    fn run_exec<'a>(&'a self, container: &'a str, cmd: Vec<String>) -> DockerFuture<'a, i64>;
}
