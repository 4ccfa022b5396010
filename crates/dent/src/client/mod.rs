//! Client module — the `DockerOps` seam between dent's logic and the daemon.

pub mod docker;
pub mod fake;
pub mod live;

pub use docker::DockerOps;
pub use fake::FakeDocker;
