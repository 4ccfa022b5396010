use bollard::models::{ContainerInspectResponse, ContainerSummary};
use std::collections::HashMap;
use std::fmt;

/// Label set on every container dent creates.
pub const MANAGED_LABEL: &str = "dent.managed";
/// Label recording the image reference a dent container was created from.
pub const IMAGE_LABEL: &str = "dent.image";

/// Coarse container state, as far as entering it is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerStatus {
    Running,
    Paused,
    /// `created` or `exited`; needs a start.
    Stopped,
    Restarting,
    /// `dead` or `removing`; cannot be entered.
    Dead,
    Missing,
}

impl ContainerStatus {
    /// Classify Docker's `State.Status` string.
    pub fn from_state_str(state: &str) -> Self {
        match state {
            "running" => ContainerStatus::Running,
            "paused" => ContainerStatus::Paused,
            "restarting" => ContainerStatus::Restarting,
            "dead" | "removing" => ContainerStatus::Dead,
            // "created", "exited" and anything the daemon adds later
            _ => ContainerStatus::Stopped,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerStatus::Running => "running",
            ContainerStatus::Paused => "paused",
            ContainerStatus::Stopped => "stopped",
            ContainerStatus::Restarting => "restarting",
            ContainerStatus::Dead => "dead",
            ContainerStatus::Missing => "missing",
        }
    }

    pub fn exists(&self) -> bool {
        *self != ContainerStatus::Missing
    }
}

impl fmt::Display for ContainerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&ContainerInspectResponse> for ContainerStatus {
    fn from(details: &ContainerInspectResponse) -> Self {
        let state = match details.state.as_ref() {
            Some(state) => state,
            None => return ContainerStatus::Stopped,
        };
        // Prefer the booleans; `status` can lag behind on older daemons.
        if state.paused.unwrap_or(false) {
            return ContainerStatus::Paused;
        }
        if state.restarting.unwrap_or(false) {
            return ContainerStatus::Restarting;
        }
        state
            .status
            .as_ref()
            .map(|s| ContainerStatus::from_state_str(&s.to_string()))
            .unwrap_or(if state.running.unwrap_or(false) {
                ContainerStatus::Running
            } else {
                ContainerStatus::Stopped
            })
    }
}

/// A container created by dent, as shown by `dent --list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedContainer {
    pub name: String,      // Without leading slash
    pub state: String,     // "running", "exited", ...
    pub image: String,
    pub labels: HashMap<String, String>,
}

impl ManagedContainer {
    pub fn is_managed(&self) -> bool {
        self.labels.get(MANAGED_LABEL).map(|v| v == "true").unwrap_or(false)
    }
}

impl From<ContainerSummary> for ManagedContainer {
    fn from(s: ContainerSummary) -> Self {
        let labels = s.labels.unwrap_or_default();
        // The label holds the reference as typed; the summary may only have an ID.
        let image = labels
            .get(IMAGE_LABEL)
            .cloned()
            .or(s.image)
            .unwrap_or_default();
        Self {
            name: s.names.as_deref()
                .and_then(|n| n.first())
                .map(|n| n.trim_start_matches('/'))
                .unwrap_or("unknown")
                .to_string(),
            state: s.state
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".into()),
            image,
            labels,
        }
    }
}
