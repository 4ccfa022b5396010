//! Exec — the interactive `docker exec` that ends every session.

use std::process::{ExitStatus, Stdio};

use crate::docker::client::cli_docker_host;
use crate::error::{DentError, DentResult};

/// A `docker exec` invocation attached to the user's terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecSpec {
    pub container: String,
    pub command: Vec<String>,
    pub tty: bool,
    pub user: Option<String>,
    pub working_dir: Option<String>,
    pub env: Vec<String>,
    /// Daemon address from the config; empty means CLI defaults.
    pub docker_host: String,
    /// Docker CLI program; empty means `docker` from `PATH`.
    pub docker_cli: String,
}

impl ExecSpec {
    /// Arguments after `docker`.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec!["exec".to_string(), "-i".to_string()];
        if self.tty {
            args.push("-t".to_string());
        }
        if let Some(user) = &self.user {
            args.push("-u".to_string());
            args.push(user.clone());
        }
        if let Some(dir) = &self.working_dir {
            args.push("-w".to_string());
            args.push(dir.clone());
        }
        for pair in &self.env {
            args.push("-e".to_string());
            args.push(pair.clone());
        }
        args.push(self.container.clone());
        args.extend(self.command.iter().cloned());
        args
    }

    /// Shell-quoted command line, as printed by `--dry-run`.
    pub fn command_line(&self) -> String {
        let mut words = vec!["docker".to_string()];
        words.extend(self.args().iter().map(|a| shell_quote(a)));
        words.join(" ")
    }

    /// Build a `tokio::process::Command` for the Docker CLI that targets
    /// the same daemon the API client is connected to.
    fn docker_cli_command(&self) -> tokio::process::Command {
        let program = if self.docker_cli.is_empty() { "docker" } else { &self.docker_cli };
        let mut cmd = tokio::process::Command::new(program);
        if let Some(host) = cli_docker_host(&self.docker_host) {
            cmd.env("DOCKER_HOST", host);
        }
        cmd
    }

    /// Run the session with inherited stdio; returns the exit code to report.
    pub async fn run(&self) -> DentResult<i32> {
        tracing::debug!(command = %self.command_line(), "Entering container");
        let status = self
            .docker_cli_command()
            .args(self.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(DentError::Exec)?;
        Ok(exit_code(status))
    }
}

/// The process's exit code, or 128 + signal number if it was killed.
pub fn exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => crate::error::EXIT_FAILURE,
    }
}

/// Single-quote `word` unless it only holds characters a shell leaves alone.
pub(crate) fn shell_quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@%+,".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}
