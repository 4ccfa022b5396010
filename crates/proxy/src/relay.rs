//! Native relay — accept on the user socket, forward each connection to the daemon.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::error::ProxyResult;

/// Pause after a failed accept, e.g. while the fd limit is exhausted.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Source of client connections.
pub trait Accept {
    fn accept(&self) -> impl Future<Output = std::io::Result<UnixStream>> + Send;
}

impl Accept for UnixListener {
    async fn accept(&self) -> std::io::Result<UnixStream> {
        UnixListener::accept(self).await.map(|(stream, _)| stream)
    }
}

/// Relay statistics for one finished connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub to_target: u64,
    pub to_client: u64,
}

/// Connect to `target` and copy bytes both ways until either side closes.
pub async fn relay(mut client: UnixStream, target: &Path) -> std::io::Result<Transfer> {
    let mut upstream = UnixStream::connect(target).await?;
    let (to_target, to_client) = tokio::io::copy_bidirectional(&mut client, &mut upstream).await?;
    Ok(Transfer { to_target, to_client })
}

/// Accept loop. Returns once `shutdown` resolves; in-flight connections are
/// left to finish on their own tasks.
pub async fn serve<A, S>(
    listener: &A,
    target: PathBuf,
    max_connections: usize,
    shutdown: S,
) -> ProxyResult<()>
where
    A: Accept,
    S: Future<Output = ()>,
{
    let target = Arc::new(target);
    let permits = Arc::new(Semaphore::new(max_connections));
    tokio::pin!(shutdown);

    loop {
        // Wait for capacity first so excess clients queue in the backlog.
        let permit = tokio::select! {
            _ = &mut shutdown => break,
            permit = Arc::clone(&permits).acquire_owned() => match permit {
                Ok(p) => p,
                Err(_) => break,
            },
        };

        let accepted = tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => accepted,
        };
        let client = match accepted {
            Ok(stream) => stream,
            Err(e) => {
                error!("Accept failed: {}", e);
                drop(permit);
                tokio::select! {
                    _ = &mut shutdown => break,
                    _ = tokio::time::sleep(ACCEPT_BACKOFF) => continue,
                }
            }
        };

        let target = Arc::clone(&target);
        tokio::spawn(async move {
            let _permit = permit;
            match relay(client, &target).await {
                Ok(t) => debug!(to_target = t.to_target, to_client = t.to_client, "Connection closed"),
                Err(e) => warn!(target = %target.display(), "Relay failed: {}", e),
            }
        });
    }

    info!("Relay stopped accepting connections");
    Ok(())
}
