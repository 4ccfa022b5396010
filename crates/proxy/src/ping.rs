//! Daemon reachability check over a Unix socket (`GET /_ping`).

use std::path::Path;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

use crate::error::{ProxyError, ProxyResult};

const PING_REQUEST: &[u8] = b"GET /_ping HTTP/1.0\r\nHost: docker\r\n\r\n";
const PING_TIMEOUT: Duration = Duration::from_secs(5);

/// Succeeds when the daemon behind `socket` answers `/_ping` with 200.
pub async fn ping(socket: &Path) -> ProxyResult<()> {
    let exchange = async {
        let mut stream = UnixStream::connect(socket).await?;
        stream.write_all(PING_REQUEST).await?;
        let mut response = Vec::new();
        // HTTP/1.0: the daemon closes the connection after the body.
        stream.read_to_end(&mut response).await?;
        Ok::<_, std::io::Error>(response)
    };

    let response = tokio::time::timeout(PING_TIMEOUT, exchange)
        .await
        .map_err(|_| ProxyError::Ping(format!("{}: timed out", socket.display())))?
        .map_err(|e| ProxyError::Ping(format!("{}: {}", socket.display(), e)))?;

    check_response(&response).map_err(|reason| ProxyError::Ping(format!("{}: {}", socket.display(), reason)))
}

fn check_response(response: &[u8]) -> Result<(), String> {
    let text = String::from_utf8_lossy(response);
    let status_line = text.lines().next().unwrap_or_default();
    let mut parts = status_line.split_whitespace();
    let version = parts.next().unwrap_or_default();
    let code = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/") {
        return Err("not an HTTP response".to_string());
    }
    if code != "200" {
        return Err(format!("unexpected status: {}", status_line.trim()));
    }
    Ok(())
}
