use thiserror::Error;

use crate::docker::DockerError;

/// Exit status for a bad command line.
pub const EXIT_USAGE: i32 = 2;
/// Exit status when dent itself fails, as `docker run` does.
pub const EXIT_FAILURE: i32 = 125;

#[derive(Debug, Error)]
pub enum DentError {
    #[error("{0}")]
    Docker(#[from] DockerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid container name: {0:?}")]
    InvalidName(String),

    #[error("Image {0} is not present locally and pulling is disabled")]
    ImageNotPresent(String),

    #[error("Container {name} is {state} and cannot be entered")]
    ContainerUnusable { name: String, state: String },

    #[error("Container {0} did not finish restarting in time")]
    StartTimeout(String),

    #[error("Failed to run the docker CLI: {0}")]
    Exec(#[source] std::io::Error),

    #[error("{0}")]
    Usage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type DentResult<T> = Result<T, DentError>;

impl DentError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            DentError::Usage(_) | DentError::InvalidName(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}
