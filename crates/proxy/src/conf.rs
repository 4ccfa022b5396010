//! Proxy configuration: file, environment, then command line.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ProxyError, ProxyResult};

pub const DEFAULT_TARGET: &str = "/var/run/docker.sock";

/// How the forwarding is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process relay.
    Native,
    /// Launch a detached `socat`.
    Socat,
}

/// Numeric owner for the listening socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner {
    pub uid: u32,
    pub gid: Option<u32>,
}

impl std::str::FromStr for Owner {
    type Err = String;

    /// `UID` or `UID:GID`, both numeric.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (uid, gid) = match s.split_once(':') {
            Some((uid, gid)) => (uid, Some(gid)),
            None => (s, None),
        };
        let uid = uid.parse().map_err(|_| format!("invalid uid in {:?}", s))?;
        let gid = gid
            .map(|g| g.parse().map_err(|_| format!("invalid gid in {:?}", s)))
            .transpose()?;
        Ok(Owner { uid, gid })
    }
}

/// Parse an octal permission string: `600`, `0600` or `0o600`.
pub fn parse_mode(s: &str) -> Result<u32, String> {
    let digits = s.trim_start_matches("0o");
    let mode = u32::from_str_radix(digits, 8).map_err(|_| format!("invalid octal mode {:?}", s))?;
    if mode > 0o777 {
        return Err(format!("mode {:?} is out of range", s));
    }
    Ok(mode)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    /// User-owned socket clients connect to.
    pub listen: PathBuf,
    /// Root-owned daemon socket.
    pub target: PathBuf,
    /// Octal permission string applied to `listen`.
    pub mode: String,
    /// `UID[:GID]` to chown `listen` to.
    pub owner: Option<String>,
    pub backend: Backend,
    pub max_connections: usize,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::with_lookup(|key| std::env::var(key).ok())
    }
}

impl ProxyConfig {
    /// Defaults, with the listen path derived from the given environment.
    pub fn with_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            listen: default_listen_path(&lookup, current_uid()),
            target: PathBuf::from(DEFAULT_TARGET),
            mode: "0600".to_string(),
            owner: None,
            backend: Backend::Native,
            max_connections: 128,
        }
    }

    /// Load configuration from the process environment.
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load() -> ProxyResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    pub fn load_with<F>(lookup: F) -> ProxyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("DENT_PROXY_CONFIG").filter(|p| !p.is_empty()) {
            Some(path) => Self::from_file(Path::new(&path), &lookup)?,
            None => Self::with_lookup(&lookup),
        };
        if let Some(listen) = lookup("DENT_PROXY_LISTEN").filter(|p| !p.is_empty()) {
            config.listen = PathBuf::from(listen);
        }
        if let Some(target) = lookup("DENT_PROXY_TARGET").filter(|p| !p.is_empty()) {
            config.target = PathBuf::from(target);
        }
        Ok(config)
    }

    /// Load configuration from TOML file; unset keys take the defaults.
    pub fn from_file<F>(path: &Path, lookup: F) -> ProxyResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        tracing::info!("Loading configuration from: {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|e| ProxyError::at(path, e))?;
        let file: ProxyFile = toml::from_str(&contents)
            .map_err(|e| ProxyError::Config(format!("{}: {}", path.display(), e)))?;
        Ok(file.overlay(Self::with_lookup(lookup)))
    }

    /// Validate configuration values
    pub fn validate(&self) -> ProxyResult<()> {
        if self.listen.as_os_str().is_empty() {
            return Err(ProxyError::Config("listen path must not be empty".to_string()));
        }
        if self.listen == self.target {
            return Err(ProxyError::Config("listen and target are the same socket".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ProxyError::Config("max_connections must be > 0".to_string()));
        }
        self.mode_bits()?;
        self.owner()?;
        Ok(())
    }

    pub fn mode_bits(&self) -> ProxyResult<u32> {
        parse_mode(&self.mode).map_err(ProxyError::Config)
    }

    pub fn owner(&self) -> ProxyResult<Option<Owner>> {
        self.owner
            .as_deref()
            .map(|o| o.parse::<Owner>().map_err(ProxyError::Config))
            .transpose()
    }
}

/// On-disk form: every key optional so the defaults can depend on the environment.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProxyFile {
    listen: Option<PathBuf>,
    target: Option<PathBuf>,
    mode: Option<String>,
    owner: Option<String>,
    backend: Option<Backend>,
    max_connections: Option<usize>,
}

impl ProxyFile {
    fn overlay(self, defaults: ProxyConfig) -> ProxyConfig {
        ProxyConfig {
            listen: self.listen.unwrap_or(defaults.listen),
            target: self.target.unwrap_or(defaults.target),
            mode: self.mode.unwrap_or(defaults.mode),
            owner: self.owner.or(defaults.owner),
            backend: self.backend.unwrap_or(defaults.backend),
            max_connections: self.max_connections.unwrap_or(defaults.max_connections),
        }
    }
}

/// `$XDG_RUNTIME_DIR/docker.sock`, else `/tmp/docker-<uid>.sock`.
pub fn default_listen_path<F>(lookup: F, uid: u32) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("XDG_RUNTIME_DIR").filter(|d| !d.is_empty()) {
        Some(dir) => Path::new(&dir).join("docker.sock"),
        None => PathBuf::from(format!("/tmp/docker-{}.sock", uid)),
    }
}

pub fn current_uid() -> u32 {
    // SAFETY: getuid has no preconditions and cannot fail.
    unsafe { libc::getuid() }
}
