//! Boot — logging init, config load, Docker connection.

use std::path::Path;

use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::conf::DentConfig;
use crate::docker::DockerClient;
use crate::error::DentResult;

/// Default filter for a verbosity level; `RUST_LOG` always wins.
pub fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "dent=warn",
        1 => "dent=debug",
        _ => "dent=trace,bollard=debug",
    }
}

/// Initialise the tracing / logging subsystem on stderr, keeping stdout
/// for the session, `--list` and `--dry-run`.
pub fn init_logging(verbose: u8) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Load config (a `--host` flag overrides it), connect to Docker and check
/// that the daemon answers before any work starts.
pub async fn boot(config_path: Option<&Path>, host: Option<&str>) -> DentResult<(DentConfig, DockerClient)> {
    let mut config = DentConfig::load(config_path)?;
    if let Some(host) = host {
        config.docker_host = host.to_string();
    }
    debug!(
        "Connecting to Docker daemon at: {}",
        if config.docker_host.is_empty() { "default socket" } else { &config.docker_host }
    );

    let docker = DockerClient::new(&config.docker_host).map_err(|e| {
        error!("Failed to connect to Docker: {}", e);
        e
    })?;
    docker.ping().await.map_err(|e| {
        error!("Docker daemon is not answering: {}", e);
        e
    })?;
    debug!("Connected to Docker daemon");
    Ok((config, docker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::DockerError;
    use crate::error::DentError;

    #[test]
    fn test_default_filter_levels() {
        assert_eq!(default_filter(0), "dent=warn");
        assert_eq!(default_filter(1), "dent=debug");
        assert!(default_filter(5).starts_with("dent=trace"));
    }

    #[tokio::test]
    async fn test_boot_reports_unreachable_daemon() {
        let dir = std::env::temp_dir().join(format!("dent-boot-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        let config = dir.join("config.toml");
        std::fs::write(&config, "").expect("write config");
        let socket = dir.join("no-daemon.sock");

        let result = boot(Some(&config), Some(&socket.display().to_string())).await;
        std::fs::remove_dir_all(&dir).ok();

        assert!(matches!(
            result,
            Err(DentError::Docker(DockerError::ConnectionFailed(_)))
        ));
    }
}
