//! Live — implements `DockerOps` for the real Bollard-backed `DockerClient`.

use crate::client::docker::{DockerFuture, DockerOps};
use crate::docker::{ContainerSpec, ContainerStatus, DockerClient, ManagedContainer};

impl DockerOps for DockerClient {
    fn container_status<'a>(&'a self, name: &'a str) -> DockerFuture<'a, ContainerStatus> {
        Box::pin(self.container_status(name))
    }

    fn create_container<'a>(&'a self, spec: &'a ContainerSpec) -> DockerFuture<'a, String> {
        Box::pin(self.create_container(spec))
    }

    fn start_container<'a>(&'a self, name: &'a str) -> DockerFuture<'a, ()> {
        Box::pin(self.start_container(name))
    }

    fn unpause_container<'a>(&'a self, name: &'a str) -> DockerFuture<'a, ()> {
        Box::pin(self.unpause_container(name))
    }

    fn remove_container<'a>(&'a self, name: &'a str, force: bool) -> DockerFuture<'a, ()> {
        Box::pin(self.remove_container(name, force))
    }

    fn list_managed(&self) -> DockerFuture<'_, Vec<ManagedContainer>> {
        Box::pin(self.list_managed())
    }

    fn image_exists<'a>(&'a self, reference: &'a str) -> DockerFuture<'a, bool> {
        Box::pin(self.image_exists(reference))
    }

    fn pull_image<'a>(&'a self, reference: &'a str) -> DockerFuture<'a, ()> {
        Box::pin(self.pull_image(reference))
    }

    fn run_exec<'a>(&'a self, container: &'a str, cmd: Vec<String>) -> DockerFuture<'a, i64> {
        Box::pin(self.run_exec(container, cmd))
    }
}
