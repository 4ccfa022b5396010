//! Command-line interface for `dent-proxy`.

use std::path::PathBuf;

use clap::Parser;

use crate::conf::{Backend, ProxyConfig};

/// Forward a user-owned socket to the Docker daemon socket.
#[derive(Parser, Debug)]
#[command(name = "dent-proxy", version, about)]
pub struct Cli {
    /// Socket to listen on (default: $XDG_RUNTIME_DIR/docker.sock)
    #[arg(short, long, value_name = "PATH")]
    pub listen: Option<PathBuf>,

    /// Daemon socket to forward to
    #[arg(short, long, value_name = "PATH")]
    pub target: Option<PathBuf>,

    /// Octal permissions for the listening socket
    #[arg(short, long, value_name = "OCTAL")]
    pub mode: Option<String>,

    /// Owner of the listening socket, as UID[:GID]
    #[arg(short, long, value_name = "UID[:GID]")]
    pub owner: Option<String>,

    /// Forwarding backend
    #[arg(short, long, value_enum)]
    pub backend: Option<Backend>,

    /// Maximum concurrent connections (native backend)
    #[arg(long, value_name = "N")]
    pub max_connections: Option<usize>,

    /// Check that the target answers /_ping and exit
    #[arg(long)]
    pub check: bool,

    /// More logging on stderr (repeat for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Command-line values override the loaded configuration.
    pub fn apply(&self, config: &mut ProxyConfig) {
        if let Some(listen) = &self.listen {
            config.listen = listen.clone();
        }
        if let Some(target) = &self.target {
            config.target = target.clone();
        }
        if let Some(mode) = &self.mode {
            config.mode = mode.clone();
        }
        if let Some(owner) = &self.owner {
            config.owner = Some(owner.clone());
        }
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(max) = self.max_connections {
            config.max_connections = max;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "dent-proxy", "-l", "/tmp/me.sock", "--backend", "socat", "-m", "0660", "-o", "1000",
        ])
        .unwrap();
        let mut config = ProxyConfig::with_lookup(|_| None);
        cli.apply(&mut config);
        assert_eq!(config.listen, PathBuf::from("/tmp/me.sock"));
        assert_eq!(config.backend, Backend::Socat);
        assert_eq!(config.mode, "0660");
        assert_eq!(config.owner.as_deref(), Some("1000"));
        assert_eq!(config.target, PathBuf::from("/var/run/docker.sock"));
    }

    #[test]
    fn test_no_flags_keep_config() {
        let cli = Cli::try_parse_from(["dent-proxy"]).unwrap();
        let mut config = ProxyConfig::with_lookup(|_| None);
        let before = config.clone();
        cli.apply(&mut config);
        assert_eq!(config, before);
        assert!(!cli.check);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Cli::try_parse_from(["dent-proxy", "--backend", "nginx"]).is_err());
    }
}
