//! Listening socket preparation: stale-socket cleanup, permissions, ownership.

use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tokio::net::{UnixListener, UnixStream};
use tracing::{info, warn};

use crate::conf::Owner;
use crate::error::{ProxyError, ProxyResult};

/// Make `path` free to bind: refuse live sockets and regular files,
/// unlink stale sockets.
pub async fn clear_stale(path: &Path) -> ProxyResult<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        if !parent.is_dir() {
            return Err(ProxyError::MissingParent(path.to_path_buf()));
        }
    }

    let metadata = match std::fs::symlink_metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(ProxyError::at(path, e)),
    };
    if !metadata.file_type().is_socket() {
        return Err(ProxyError::NotASocket(path.to_path_buf()));
    }
    if UnixStream::connect(path).await.is_ok() {
        return Err(ProxyError::AddressInUse(path.to_path_buf()));
    }

    warn!(path = %path.display(), "Removing stale socket");
    std::fs::remove_file(path).map_err(|e| ProxyError::at(path, e))
}

/// A bound listener whose socket file is unlinked on drop.
pub struct BoundSocket {
    pub listener: UnixListener,
    path: PathBuf,
}

impl BoundSocket {
    /// Clear `path`, bind it, then apply `mode` and `owner`.
    pub async fn bind(path: &Path, mode: u32, owner: Option<Owner>) -> ProxyResult<Self> {
        clear_stale(path).await?;
        let listener = UnixListener::bind(path).map_err(|e| ProxyError::at(path, e))?;
        // From here the file exists; dropping `bound` on error unlinks it.
        let bound = BoundSocket {
            listener,
            path: path.to_path_buf(),
        };

        std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .map_err(|e| ProxyError::at(path, e))?;
        if let Some(owner) = owner {
            std::os::unix::fs::chown(path, Some(owner.uid), owner.gid)
                .map_err(|e| ProxyError::at(path, e))?;
        }
        info!(path = %path.display(), mode = %format!("{:o}", mode), "Listening");
        Ok(bound)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for BoundSocket {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), "Failed to remove socket: {}", e);
            }
        }
    }
}
