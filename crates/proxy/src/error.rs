use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("{0} is already served by a live listener")]
    AddressInUse(PathBuf),

    #[error("{0} exists and is not a socket; refusing to replace it")]
    NotASocket(PathBuf),

    #[error("Directory for {0} does not exist")]
    MissingParent(PathBuf),

    #[error("socat not found in PATH")]
    SocatNotFound,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Docker daemon check failed: {0}")]
    Ping(String),

    #[error("I/O error on {path}: {source}")]
    Path {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProxyError {
    pub(crate) fn at(path: &std::path::Path, source: std::io::Error) -> Self {
        ProxyError::Path {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;
