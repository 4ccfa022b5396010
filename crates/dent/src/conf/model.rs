//! Model — DentConfig.

use serde::Deserialize;

use crate::enter::naming::validate_container_name;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DentConfig {
    /// Daemon address; empty means bollard / docker CLI defaults.
    pub docker_host: String,
    /// Images tried in order when no target is given.
    pub base_images: Vec<String>,
    /// Shells probed in order when no command is given.
    pub shells: Vec<String>,
    /// Prefix of derived container names.
    pub name_prefix: String,
    /// Command new containers idle in.
    pub keepalive: Vec<String>,
    /// Default `--user` for exec sessions.
    pub default_user: Option<String>,
    /// Extra `KEY=VALUE` pairs for new containers and sessions.
    pub env: Vec<String>,
    /// Extra binds for new containers.
    pub volumes: Vec<String>,
    pub start_timeout_secs: u64,
    /// Docker CLI program that runs interactive sessions.
    pub docker_cli: String,
}

impl Default for DentConfig {
    fn default() -> Self {
        Self {
            docker_host: "".to_string(),
            base_images: vec![
                "ubuntu:latest".to_string(),
                "debian:stable-slim".to_string(),
                "alpine:latest".to_string(),
            ],
            shells: vec!["/bin/bash".to_string(), "/bin/sh".to_string()],
            name_prefix: "dent-".to_string(),
            keepalive: vec!["/bin/sh".to_string()],
            default_user: None,
            env: Vec::new(),
            volumes: Vec::new(),
            start_timeout_secs: 30,
            docker_cli: "docker".to_string(),
        }
    }
}

impl DentConfig {
    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.base_images.iter().all(|i| i.trim().is_empty()) {
            return Err("base_images must name at least one image".to_string());
        }
        if self.shells.iter().all(|s| s.trim().is_empty()) {
            return Err("shells must name at least one shell".to_string());
        }
        if !self.name_prefix.is_empty() {
            // The prefix starts every derived name, so it must itself start one.
            validate_container_name(&self.name_prefix)
                .map_err(|_| format!("name_prefix {:?} is not a valid container name start", self.name_prefix))?;
        }
        if self.start_timeout_secs == 0 {
            return Err("start_timeout_secs must be > 0".to_string());
        }
        if self.docker_cli.trim().is_empty() {
            return Err("docker_cli must name a program".to_string());
        }
        for pair in &self.env {
            if !pair.contains('=') {
                return Err(format!("env entry {:?} is not KEY=VALUE", pair));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Defaults ─────────────────────────────────────────────────

    #[test]
    fn test_default_base_images_order() {
        let cfg = DentConfig::default();
        assert_eq!(cfg.base_images, vec!["ubuntu:latest", "debian:stable-slim", "alpine:latest"]);
    }

    #[test]
    fn test_default_shells_prefer_bash() {
        let cfg = DentConfig::default();
        assert_eq!(cfg.shells.first().map(String::as_str), Some("/bin/bash"));
    }

    #[test]
    fn test_default_docker_host_empty() {
        let cfg = DentConfig::default();
        assert!(cfg.docker_host.is_empty(), "Default docker_host should be empty (use system default)");
    }

    #[test]
    fn test_default_validates() {
        assert!(DentConfig::default().validate().is_ok());
    }

    // ── Validation ───────────────────────────────────────────────

    #[test]
    fn test_validate_rejects_empty_base_images() {
        let cfg = DentConfig { base_images: vec![], ..Default::default() };
        let err = cfg.validate().unwrap_err();
        assert!(err.contains("base_images"), "Error should mention base_images: {}", err);
    }

    #[test]
    fn test_validate_rejects_empty_shells() {
        let cfg = DentConfig { shells: vec!["".to_string()], ..Default::default() };
        assert!(cfg.validate().unwrap_err().contains("shells"));
    }

    #[test]
    fn test_validate_rejects_bad_prefix() {
        let cfg = DentConfig { name_prefix: "/dent".to_string(), ..Default::default() };
        assert!(cfg.validate().unwrap_err().contains("name_prefix"));
    }

    #[test]
    fn test_validate_allows_empty_prefix() {
        let cfg = DentConfig { name_prefix: String::new(), ..Default::default() };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let cfg = DentConfig { start_timeout_secs: 0, ..Default::default() };
        assert!(cfg.validate().unwrap_err().contains("start_timeout_secs"));
    }

    #[test]
    fn test_validate_rejects_empty_docker_cli() {
        let cfg = DentConfig { docker_cli: " ".to_string(), ..Default::default() };
        assert!(cfg.validate().unwrap_err().contains("docker_cli"));
    }

    #[test]
    fn test_validate_rejects_env_without_equals() {
        let cfg = DentConfig { env: vec!["TERM".to_string()], ..Default::default() };
        assert!(cfg.validate().unwrap_err().contains("TERM"));
    }

    // ── Deserialization ──────────────────────────────────────────

    #[test]
    fn test_deserialize_partial_toml() {
        let toml_str = r#"base_images = ["fedora:40"]"#;
        let cfg: DentConfig = toml::from_str(toml_str).expect("Should accept partial TOML");
        assert_eq!(cfg.base_images, vec!["fedora:40"]);
        assert_eq!(cfg.name_prefix, "dent-"); // default
        assert_eq!(cfg.start_timeout_secs, 30); // default
    }

    #[test]
    fn test_deserialize_full_toml() {
        let toml_str = r#"
            docker_host = "unix:///run/user/1000/docker.sock"
            shells = ["/usr/bin/zsh", "/bin/sh"]
            name_prefix = "dev-"
            default_user = "1000:1000"
            env = ["TERM=xterm-256color"]
            volumes = ["/home/me/src:/src"]
            docker_cli = "/usr/local/bin/docker"
        "#;
        let cfg: DentConfig = toml::from_str(toml_str).expect("Should parse full TOML");
        assert_eq!(cfg.docker_host, "unix:///run/user/1000/docker.sock");
        assert_eq!(cfg.shells[0], "/usr/bin/zsh");
        assert_eq!(cfg.default_user.as_deref(), Some("1000:1000"));
        assert_eq!(cfg.volumes, vec!["/home/me/src:/src"]);
        assert_eq!(cfg.docker_cli, "/usr/local/bin/docker");
    }
}
