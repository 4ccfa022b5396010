//! Enter — resolve, prepare and run one dent session.
//!
//! A session is: find the container ([`resolve`]), bring it to the running
//! state ([`plan`]), choose the command ([`shell`]) and hand the terminal to
//! `docker exec` ([`exec`]).

pub mod exec;
pub mod naming;
pub mod plan;
pub mod resolve;
pub mod shell;

use std::io::Write;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::client::DockerOps;
use crate::conf::DentConfig;
use crate::docker::ContainerStatus;
use crate::error::{DentError, DentResult};
use exec::ExecSpec;

/// One invocation's request, after CLI parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnterRequest {
    /// Container name or image reference.
    pub target: Option<String>,
    pub name: Option<String>,
    pub image: Option<String>,
    /// Overrides the configured base images when non-empty.
    pub base_images: Vec<String>,
    pub command: Vec<String>,
    pub user: Option<String>,
    pub workdir: Option<String>,
    pub env: Vec<String>,
    pub volumes: Vec<String>,
    /// Directory to bind at the same path and work in.
    pub mount_cwd: Option<PathBuf>,
    pub remove_after: bool,
    pub tty: bool,
    pub pull: bool,
    pub dry_run: bool,
}

impl EnterRequest {
    /// Checks that need no daemon: names and `KEY=VALUE` pairs.
    pub fn validate(&self) -> DentResult<()> {
        if let Some(name) = &self.name {
            naming::validate_container_name(name)?;
        }
        if let Some(pair) = self.env.iter().find(|pair| !pair.contains('=')) {
            return Err(DentError::Usage(format!("--env {:?} is not KEY=VALUE", pair)));
        }
        Ok(())
    }

    /// `--workdir`, else the mounted current directory.
    pub fn working_dir(&self) -> Option<String> {
        self.workdir
            .clone()
            .or_else(|| self.mount_cwd.as_ref().map(|p| p.display().to_string()))
    }
}

/// A container ready to be entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub exec: ExecSpec,
    pub remove_after: bool,
}

/// Resolve the target and bring it up; prints the steps instead under `--dry-run`.
pub async fn prepare(
    docker: &dyn DockerOps,
    request: &EnterRequest,
    config: &DentConfig,
    out: &mut dyn Write,
) -> DentResult<Session> {
    let target = resolve::resolve(docker, request, config).await?;
    info!(container = %target.container, status = %target.status, "Resolved target");

    let plan = plan::plan(&target, request, config)?;
    plan::apply(docker, &plan, config, request.dry_run, out).await?;

    let running = !request.dry_run || target.status == ContainerStatus::Running;
    let command = shell::select_command(
        docker,
        &target.container,
        &request.command,
        &config.shells,
        running,
    )
    .await;

    Ok(Session {
        exec: ExecSpec {
            container: target.container,
            command,
            tty: request.tty,
            user: request.user.clone().or_else(|| config.default_user.clone()),
            working_dir: request.working_dir(),
            env: config.env.iter().chain(&request.env).cloned().collect(),
            docker_host: config.docker_host.clone(),
            docker_cli: config.docker_cli.clone(),
        },
        remove_after: request.remove_after,
    })
}

/// Run a full session and return the exit code dent should exit with.
pub async fn run(
    docker: &dyn DockerOps,
    request: &EnterRequest,
    config: &DentConfig,
    out: &mut dyn Write,
) -> DentResult<i32> {
    let session = prepare(docker, request, config, out).await?;
    let container = session.exec.container.clone();

    if request.dry_run {
        writeln!(out, "{}", session.exec.command_line())?;
        if session.remove_after {
            writeln!(out, "docker rm -f {}", container)?;
        }
        return Ok(0);
    }

    let result = session.exec.run().await;
    if let Ok(code) = &result {
        info!(container = %container, code, "Session ended");
    }

    // Removal failures never mask the session's own outcome.
    if session.remove_after {
        match docker.remove_container(&container, true).await {
            Ok(()) => info!(container = %container, "Removed container"),
            Err(e) => warn!(container = %container, error = %e, "Failed to remove container"),
        }
    }
    result
}

/// Print every dent-managed container as `NAME\tSTATE\tIMAGE`.
pub async fn list(docker: &dyn DockerOps, out: &mut dyn Write) -> DentResult<()> {
    for container in docker.list_managed().await? {
        writeln!(out, "{}\t{}\t{}", container.name, container.state, container.image)?;
    }
    Ok(())
}
