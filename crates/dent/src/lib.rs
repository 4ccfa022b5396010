// Module structure for dent, the Docker ENTer tool.

// Core infrastructure
pub mod client;
pub mod conf;
pub mod docker;
pub mod error;

// Domain modules
pub mod cli;
pub mod enter;
pub mod runtime;
