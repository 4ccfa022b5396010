//! Shell — choose the command a session runs.

use tracing::{debug, warn};

use crate::client::DockerOps;

/// The explicit command if one was given, else the first usable shell.
///
/// With `probe` unset (the container is not running yet, e.g. under
/// `--dry-run`) the first configured shell is assumed.
pub async fn select_command(
    docker: &dyn DockerOps,
    container: &str,
    explicit: &[String],
    shells: &[String],
    probe: bool,
) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    let shells: Vec<&String> = shells.iter().filter(|s| !s.trim().is_empty()).collect();
    if !probe {
        return shells.first().map(|s| vec![s.to_string()]).unwrap_or_default();
    }

    for shell in &shells {
        let cmd = vec!["test".to_string(), "-x".to_string(), shell.to_string()];
        match docker.run_exec(container, cmd).await {
            Ok(0) => {
                debug!(container = %container, shell = %shell, "Shell is available");
                return vec![shell.to_string()];
            }
            Ok(code) => debug!(container = %container, shell = %shell, code, "Shell not available"),
            Err(e) => warn!(container = %container, shell = %shell, "Shell probe failed: {}", e),
        }
    }

    shells.last().map(|s| vec![s.to_string()]).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{FakeContainer, FakeDocker};
    use crate::docker::ContainerStatus;

    fn shells() -> Vec<String> {
        vec!["/bin/bash".to_string(), "/bin/sh".to_string()]
    }

    async fn fake_with(executables: &[&str]) -> FakeDocker {
        let fake = FakeDocker::new();
        let c = FakeContainer::new("alpine:latest", ContainerStatus::Running).with_executables(executables);
        fake.add_container("box", c).await;
        fake
    }

    #[tokio::test]
    async fn test_explicit_command_wins() {
        let fake = fake_with(&[]).await;
        let cmd = vec!["python3".to_string(), "-q".to_string()];
        assert_eq!(select_command(&fake, "box", &cmd, &shells(), true).await, cmd);
        assert!(fake.calls().await.is_empty(), "no probe when a command is given");
    }

    #[tokio::test]
    async fn test_prefers_first_available_shell() {
        let fake = fake_with(&["/bin/bash", "/bin/sh"]).await;
        assert_eq!(select_command(&fake, "box", &[], &shells(), true).await, vec!["/bin/bash"]);
    }

    #[tokio::test]
    async fn test_skips_missing_shell() {
        let fake = fake_with(&["/bin/sh"]).await;
        assert_eq!(select_command(&fake, "box", &[], &shells(), true).await, vec!["/bin/sh"]);
        assert_eq!(
            fake.calls().await,
            vec!["exec box test -x /bin/bash", "exec box test -x /bin/sh"]
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_last_shell() {
        let fake = fake_with(&[]).await;
        assert_eq!(select_command(&fake, "box", &[], &shells(), true).await, vec!["/bin/sh"]);
    }

    #[tokio::test]
    async fn test_without_probe_assumes_first() {
        let fake = FakeDocker::new();
        assert_eq!(select_command(&fake, "ghost", &[], &shells(), false).await, vec!["/bin/bash"]);
    }
}
