//! Docker module — bollard-backed client and the domain types it returns.

pub mod client;
pub mod container;
pub mod image;
pub mod inventory;
pub mod shell;

pub use client::{DockerClient, DockerError};
pub use container::ContainerSpec;
pub use inventory::{ContainerStatus, ManagedContainer};
