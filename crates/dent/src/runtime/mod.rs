//! Runtime module — process lifecycle: logging, config, Docker connection.

pub mod boot;
