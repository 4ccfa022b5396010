//! Plan — pick the lifecycle steps a target needs before it can be entered.

use std::io::Write;
use std::time::{Duration, Instant};

use tracing::info;

use super::exec::shell_quote;
use super::resolve::Target;
use super::EnterRequest;
use crate::client::DockerOps;
use crate::conf::DentConfig;
use crate::docker::{ContainerSpec, ContainerStatus};
use crate::error::{DentError, DentResult};

const RESTART_POLL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Pull(String),
    Create(ContainerSpec),
    Unpause,
    Start,
    AwaitRunning,
}

impl Step {
    /// The equivalent Docker CLI invocation, for `--dry-run`.
    pub fn describe(&self, container: &str) -> String {
        match self {
            Step::Pull(image) => format!("docker pull {}", shell_quote(image)),
            Step::Create(spec) => {
                let mut parts = vec![
                    "docker create -it".to_string(),
                    format!("--name {}", shell_quote(&spec.name)),
                    format!("--hostname {}", shell_quote(&spec.name)),
                ];
                for (key, value) in sorted_labels(spec) {
                    parts.push(format!("--label {}", shell_quote(&format!("{}={}", key, value))));
                }
                for pair in &spec.env {
                    parts.push(format!("-e {}", shell_quote(pair)));
                }
                for bind in &spec.binds {
                    parts.push(format!("-v {}", shell_quote(bind)));
                }
                if let Some(dir) = &spec.working_dir {
                    parts.push(format!("-w {}", shell_quote(dir)));
                }
                parts.push(shell_quote(&spec.image));
                parts.extend(spec.keepalive.iter().map(|word| shell_quote(word)));
                parts.join(" ")
            }
            Step::Unpause => format!("docker unpause {}", container),
            Step::Start => format!("docker start {}", container),
            Step::AwaitRunning => format!("# wait for {} to finish restarting", container),
        }
    }
}

fn sorted_labels(spec: &ContainerSpec) -> Vec<(String, String)> {
    let mut labels: Vec<_> = spec.labels().into_iter().collect();
    labels.sort();
    labels
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub container: String,
    pub steps: Vec<Step>,
}

/// Decide the steps for `target` from its current status.
pub fn plan(target: &Target, request: &EnterRequest, config: &DentConfig) -> DentResult<Plan> {
    let steps = match target.status {
        ContainerStatus::Running => vec![],
        ContainerStatus::Paused => vec![Step::Unpause],
        ContainerStatus::Stopped => vec![Step::Start],
        ContainerStatus::Restarting => vec![Step::AwaitRunning],
        ContainerStatus::Dead => {
            return Err(DentError::ContainerUnusable {
                name: target.container.clone(),
                state: target.status.to_string(),
            })
        }
        ContainerStatus::Missing => {
            let image = target.image.clone().ok_or_else(|| {
                DentError::Config(format!("no image to create {} from", target.container))
            })?;
            let mut steps = Vec::new();
            if !target.image_local {
                if !request.pull {
                    return Err(DentError::ImageNotPresent(image));
                }
                steps.push(Step::Pull(image.clone()));
            }
            steps.push(Step::Create(container_spec(&target.container, image, request, config)));
            steps.push(Step::Start);
            steps
        }
    };
    Ok(Plan {
        container: target.container.clone(),
        steps,
    })
}

fn container_spec(name: &str, image: String, request: &EnterRequest, config: &DentConfig) -> ContainerSpec {
    let mut binds: Vec<String> = config.volumes.iter().chain(&request.volumes).cloned().collect();
    if let Some(cwd) = &request.mount_cwd {
        let path = cwd.display().to_string();
        binds.push(format!("{}:{}", path, path));
    }
    ContainerSpec {
        name: name.to_string(),
        image,
        keepalive: config.keepalive.clone(),
        working_dir: request.working_dir(),
        env: config.env.iter().chain(&request.env).cloned().collect(),
        binds,
    }
}

/// Carry out the plan, or print it when `dry_run` is set.
pub async fn apply(
    docker: &dyn DockerOps,
    plan: &Plan,
    config: &DentConfig,
    dry_run: bool,
    out: &mut dyn Write,
) -> DentResult<()> {
    for step in &plan.steps {
        if dry_run {
            writeln!(out, "{}", step.describe(&plan.container))?;
            continue;
        }
        match step {
            Step::Pull(image) => {
                info!(image = %image, "Pulling image");
                docker.pull_image(image).await?;
            }
            Step::Create(spec) => {
                let id = docker.create_container(spec).await?;
                info!(container = %spec.name, image = %spec.image, id = %id, "Created container");
            }
            Step::Unpause => {
                docker.unpause_container(&plan.container).await?;
                info!(container = %plan.container, "Unpaused container");
            }
            Step::Start => {
                docker.start_container(&plan.container).await?;
                info!(container = %plan.container, "Started container");
            }
            Step::AwaitRunning => {
                await_running(docker, &plan.container, config.start_timeout_secs).await?;
            }
        }
    }
    Ok(())
}

/// Poll until a restarting container reports running.
async fn await_running(docker: &dyn DockerOps, container: &str, timeout_secs: u64) -> DentResult<()> {
    let deadline = Instant::now() + Duration::from_secs(timeout_secs);
    loop {
        match docker.container_status(container).await? {
            ContainerStatus::Running => return Ok(()),
            ContainerStatus::Restarting if Instant::now() < deadline => {
                tokio::time::sleep(RESTART_POLL).await;
            }
            ContainerStatus::Restarting => return Err(DentError::StartTimeout(container.to_string())),
            // Gave up restarting; it needs a plain start now.
            ContainerStatus::Stopped => {
                docker.start_container(container).await?;
                return Ok(());
            }
            other => {
                return Err(DentError::ContainerUnusable {
                    name: container.to_string(),
                    state: other.to_string(),
                })
            }
        }
    }
}
