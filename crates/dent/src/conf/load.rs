//! Load — config file discovery, TOML parsing and environment overrides.

use std::path::{Path, PathBuf};

use super::model::DentConfig;
use crate::error::DentError;

impl DentConfig {
    /// Load configuration from the process environment.
    /// Priority: Environment Variables > Config File > Defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, DentError> {
        Self::load_with(explicit_path, |key| std::env::var(key).ok())
    }

    /// Same as [`DentConfig::load`] with an injectable variable lookup.
    pub fn load_with<F>(explicit_path: Option<&Path>, lookup: F) -> Result<Self, DentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match explicit_path {
            // A path the user named must exist.
            Some(path) => Self::from_file(path)?,
            None => match default_config_path(&lookup) {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    tracing::debug!("Config file not found at {}, using defaults", path.display());
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env(&lookup);
        config.validate().map_err(DentError::Config)?;
        Ok(config)
    }

    /// Load configuration from TOML file
    pub fn from_file(path: &Path) -> Result<Self, DentError> {
        tracing::debug!("Loading configuration from: {}", path.display());
        let contents = std::fs::read_to_string(path)
            .map_err(|e| DentError::Config(format!("{}: {}", path.display(), e)))?;
        toml::from_str(&contents).map_err(|e| DentError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Environment variables override file config.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("DOCKER_HOST").filter(|h| !h.is_empty()) {
            self.docker_host = host;
        }
        if let Some(images) = lookup("DENT_BASE_IMAGES") {
            self.base_images = split_list(&images);
        }
        if let Some(shells) = lookup("DENT_SHELLS") {
            self.shells = split_list(&shells);
        }
        if let Some(prefix) = lookup("DENT_NAME_PREFIX") {
            self.name_prefix = prefix;
        }
    }
}

/// `$DENT_CONFIG`, else `$XDG_CONFIG_HOME/dent/config.toml`,
/// else `$HOME/.config/dent/config.toml`.
pub fn default_config_path<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(path) = lookup("DENT_CONFIG").filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    if let Some(xdg) = lookup("XDG_CONFIG_HOME").filter(|p| !p.is_empty()) {
        return Some(Path::new(&xdg).join("dent").join("config.toml"));
    }
    lookup("HOME")
        .filter(|p| !p.is_empty())
        .map(|home| Path::new(&home).join(".config").join("dent").join("config.toml"))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dent-conf-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn test_default_path_prefers_dent_config() {
        let path = default_config_path(env(&[
            ("DENT_CONFIG", "/etc/dent.toml"),
            ("XDG_CONFIG_HOME", "/xdg"),
            ("HOME", "/home/me"),
        ]));
        assert_eq!(path, Some(PathBuf::from("/etc/dent.toml")));
    }

    #[test]
    fn test_default_path_xdg_then_home() {
        assert_eq!(
            default_config_path(env(&[("XDG_CONFIG_HOME", "/xdg"), ("HOME", "/home/me")])),
            Some(PathBuf::from("/xdg/dent/config.toml"))
        );
        assert_eq!(
            default_config_path(env(&[("HOME", "/home/me")])),
            Some(PathBuf::from("/home/me/.config/dent/config.toml"))
        );
        assert_eq!(default_config_path(env(&[])), None);
    }

    #[test]
    fn test_missing_default_file_uses_defaults() {
        let cfg = DentConfig::load_with(None, env(&[("HOME", "/nonexistent-dent-home")])).unwrap();
        assert_eq!(cfg, DentConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let err = DentConfig::load_with(Some(Path::new("/nonexistent/dent.toml")), env(&[])).unwrap_err();
        assert!(matches!(err, DentError::Config(_)));
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = scratch_dir("override");
        let path = dir.join("config.toml");
        std::fs::write(&path, "base_images = [\"fedora:40\"]\nname_prefix = \"box-\"\n").unwrap();

        let cfg = DentConfig::load_with(
            Some(&path),
            env(&[("DENT_NAME_PREFIX", "env-"), ("DOCKER_HOST", "unix:///tmp/d.sock")]),
        )
        .unwrap();
        assert_eq!(cfg.base_images, vec!["fedora:40"]);
        assert_eq!(cfg.name_prefix, "env-");
        assert_eq!(cfg.docker_host, "unix:///tmp/d.sock");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_env_lists_are_comma_separated() {
        let mut cfg = DentConfig::default();
        cfg.apply_env(env(&[("DENT_BASE_IMAGES", "a:1, b:2,,"), ("DENT_SHELLS", "/bin/zsh")]));
        assert_eq!(cfg.base_images, vec!["a:1", "b:2"]);
        assert_eq!(cfg.shells, vec!["/bin/zsh"]);
    }

    #[test]
    fn test_invalid_file_values_fail_validation() {
        let dir = scratch_dir("invalid");
        let path = dir.join("config.toml");
        std::fs::write(&path, "base_images = []\n").unwrap();

        let err = DentConfig::load_with(Some(&path), env(&[])).unwrap_err();
        assert!(err.to_string().contains("base_images"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
