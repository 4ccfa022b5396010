//! Shell domain — non-interactive exec used to probe a container.

use super::client::{DockerClient, DockerError};
use futures_util::stream::StreamExt;

impl DockerClient {
    /// Create an exec instance in a container.
    /// Returns the exec ID that can be used with `start_exec`.
    async fn create_exec(&self, container: &str, cmd: Vec<String>) -> Result<String, DockerError> {
        use bollard::models::ExecConfig;

        let config = ExecConfig {
            attach_stdin: Some(false),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            tty: Some(false),
            cmd: Some(cmd),
            ..Default::default()
        };

        let result = self
            .client
            .create_exec(container, config)
            .await
            .map_err(|e| DockerError::for_container(container, e))?;

        Ok(result.id)
    }

    /// Run `cmd` inside `container` without a TTY, discard its output and
    /// return its exit code.
    pub async fn run_exec(&self, container: &str, cmd: Vec<String>) -> Result<i64, DockerError> {
        use bollard::exec::{StartExecOptions, StartExecResults};

        let exec_id = self.create_exec(container, cmd).await?;

        let options = Some(StartExecOptions {
            detach: false,
            tty: false,
            ..Default::default()
        });

        match self.client.start_exec(&exec_id, options).await? {
            StartExecResults::Attached { mut output, .. } => {
                while let Some(chunk) = output.next().await {
                    if let Err(e) = chunk {
                        tracing::debug!(exec_id = %exec_id, "Exec output stream error: {}", e);
                        break;
                    }
                }
            }
            StartExecResults::Detached => {}
        }

        let inspect = self.client.inspect_exec(&exec_id).await?;
        Ok(inspect.exit_code.unwrap_or(-1))
    }
}
