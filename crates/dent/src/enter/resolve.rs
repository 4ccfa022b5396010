//! Resolve — turn the command line into the container to enter.

use tracing::debug;

use super::naming::{container_name_for_image, normalize_image, validate_container_name};
use super::EnterRequest;
use crate::client::DockerOps;
use crate::conf::DentConfig;
use crate::docker::ContainerStatus;
use crate::error::{DentError, DentResult};

/// The container an invocation will enter, and how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub container: String,
    /// Image to create from; only meaningful when the container is missing.
    pub image: Option<String>,
    pub status: ContainerStatus,
    /// Whether `image` is already in the local store.
    pub image_local: bool,
}

/// Work out which container to enter and what state it is in.
pub async fn resolve(
    docker: &dyn DockerOps,
    request: &EnterRequest,
    config: &DentConfig,
) -> DentResult<Target> {
    let candidates = base_candidates(request, config);

    if let Some(name) = request.name.as_deref() {
        validate_container_name(name)?;
        let image = request
            .image
            .as_deref()
            .or(request.target.as_deref())
            .map(normalize_image);
        return with_image(docker, name.to_string(), image, &candidates).await;
    }

    if let Some(target) = request.target.as_deref() {
        // An existing container named exactly TARGET wins over image lookup.
        if validate_container_name(target).is_ok() {
            let status = docker.container_status(target).await?;
            if status.exists() {
                debug!(container = %target, %status, "Target names an existing container");
                return Ok(Target {
                    container: target.to_string(),
                    image: None,
                    status,
                    image_local: true,
                });
            }
        }
        let container = container_name_for_image(&config.name_prefix, target);
        let image = normalize_image(request.image.as_deref().unwrap_or(target));
        return with_image(docker, container, Some(image), &candidates).await;
    }

    if let Some(image) = request.image.as_deref() {
        let container = container_name_for_image(&config.name_prefix, image);
        return with_image(docker, container, Some(normalize_image(image)), &candidates).await;
    }

    iterate_base_images(docker, &config.name_prefix, &candidates).await
}

/// Base images for this invocation: `--base` flags, else the configured list.
fn base_candidates(request: &EnterRequest, config: &DentConfig) -> Vec<String> {
    let list = if request.base_images.is_empty() {
        &config.base_images
    } else {
        &request.base_images
    };
    list.iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .map(normalize_image)
        .collect()
}

/// Status of a known container name; picks an image only if it must be created.
async fn with_image(
    docker: &dyn DockerOps,
    container: String,
    image: Option<String>,
    candidates: &[String],
) -> DentResult<Target> {
    validate_container_name(&container)?;
    let status = docker.container_status(&container).await?;
    if status.exists() {
        return Ok(Target { container, image, status, image_local: true });
    }

    let (image, image_local) = match image {
        Some(image) => {
            let local = docker.image_exists(&image).await?;
            (image, local)
        }
        None => choose_base_image(docker, candidates).await?,
    };
    Ok(Target {
        container,
        image: Some(image),
        status,
        image_local,
    })
}

/// Walk the base images in order: an existing derived container wins, then
/// the first locally present image, then the first candidate (to be pulled).
pub async fn iterate_base_images(
    docker: &dyn DockerOps,
    prefix: &str,
    candidates: &[String],
) -> DentResult<Target> {
    if candidates.is_empty() {
        return Err(DentError::Config("no base images configured".to_string()));
    }

    for image in candidates {
        let container = container_name_for_image(prefix, image);
        let status = docker.container_status(&container).await?;
        if status.exists() {
            debug!(container = %container, image = %image, %status, "Found container for base image");
            return Ok(Target {
                container,
                image: Some(image.clone()),
                status,
                image_local: true,
            });
        }
    }

    let (image, image_local) = choose_base_image(docker, candidates).await?;
    Ok(Target {
        container: container_name_for_image(prefix, &image),
        image: Some(image),
        status: ContainerStatus::Missing,
        image_local,
    })
}

/// First locally present candidate, else the first candidate.
async fn choose_base_image(docker: &dyn DockerOps, candidates: &[String]) -> DentResult<(String, bool)> {
    for image in candidates {
        if docker.image_exists(image).await? {
            debug!(image = %image, "Using locally present base image");
            return Ok((image.clone(), true));
        }
    }
    candidates
        .first()
        .map(|image| (image.clone(), false))
        .ok_or_else(|| DentError::Config("no base images configured".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::{FakeContainer, FakeDocker};

    fn request() -> EnterRequest {
        EnterRequest::default()
    }

    #[tokio::test]
    async fn test_target_existing_container_wins() {
        let fake = FakeDocker::new();
        fake.add_container("work", FakeContainer::new("ubuntu:latest", ContainerStatus::Stopped)).await;

        let req = EnterRequest { target: Some("work".into()), ..request() };
        let target = resolve(&fake, &req, &DentConfig::default()).await.unwrap();
        assert_eq!(target.container, "work");
        assert_eq!(target.status, ContainerStatus::Stopped);
        assert_eq!(target.image, None);
    }

    #[tokio::test]
    async fn test_target_as_image_derives_name() {
        let fake = FakeDocker::new();
        fake.add_image("python:3.12").await;

        let req = EnterRequest { target: Some("python:3.12".into()), ..request() };
        let target = resolve(&fake, &req, &DentConfig::default()).await.unwrap();
        assert_eq!(target.container, "dent-python-3.12");
        assert_eq!(target.image.as_deref(), Some("python:3.12"));
        assert_eq!(target.status, ContainerStatus::Missing);
        assert!(target.image_local);
    }

    #[tokio::test]
    async fn test_target_image_not_local() {
        let fake = FakeDocker::new();
        let req = EnterRequest { target: Some("busybox".into()), ..request() };
        let target = resolve(&fake, &req, &DentConfig::default()).await.unwrap();
        assert_eq!(target.container, "dent-busybox");
        assert_eq!(target.image.as_deref(), Some("busybox:latest"));
        assert!(!target.image_local);
    }

    #[tokio::test]
    async fn test_image_flag_overrides_image_not_name() {
        let fake = FakeDocker::new();
        let req = EnterRequest {
            target: Some("tools".into()),
            image: Some("alpine:3.20".into()),
            ..request()
        };
        let target = resolve(&fake, &req, &DentConfig::default()).await.unwrap();
        assert_eq!(target.container, "dent-tools");
        assert_eq!(target.image.as_deref(), Some("alpine:3.20"));
    }

    #[tokio::test]
    async fn test_name_flag_with_target_image() {
        let fake = FakeDocker::new();
        let req = EnterRequest {
            name: Some("scratchpad".into()),
            target: Some("fedora".into()),
            ..request()
        };
        let target = resolve(&fake, &req, &DentConfig::default()).await.unwrap();
        assert_eq!(target.container, "scratchpad");
        assert_eq!(target.image.as_deref(), Some("fedora:latest"));
    }

    #[tokio::test]
    async fn test_name_flag_without_image_uses_base_images() {
        let fake = FakeDocker::new();
        fake.add_image("alpine:latest").await;
        let req = EnterRequest { name: Some("scratchpad".into()), ..request() };
        let target = resolve(&fake, &req, &DentConfig::default()).await.unwrap();
        assert_eq!(target.container, "scratchpad");
        assert_eq!(target.image.as_deref(), Some("alpine:latest"));
        assert!(target.image_local);
    }

    #[tokio::test]
    async fn test_invalid_name_flag_rejected() {
        let fake = FakeDocker::new();
        let req = EnterRequest { name: Some("bad name".into()), ..request() };
        let err = resolve(&fake, &req, &DentConfig::default()).await.unwrap_err();
        assert!(matches!(err, DentError::InvalidName(_)));
    }

    // ── Base-image iteration ─────────────────────────────────────

    #[tokio::test]
    async fn test_base_iteration_prefers_existing_container() {
        let fake = FakeDocker::new();
        fake.add_image("ubuntu:latest").await;
        fake.add_container("dent-alpine", FakeContainer::new("alpine:latest", ContainerStatus::Running)).await;

        let target = resolve(&fake, &request(), &DentConfig::default()).await.unwrap();
        assert_eq!(target.container, "dent-alpine");
        assert_eq!(target.status, ContainerStatus::Running);
    }

    #[tokio::test]
    async fn test_base_iteration_first_existing_container_in_order() {
        let fake = FakeDocker::new();
        fake.add_container("dent-alpine", FakeContainer::new("alpine:latest", ContainerStatus::Running)).await;
        fake.add_container("dent-debian-stable-slim", FakeContainer::new("debian:stable-slim", ContainerStatus::Stopped)).await;

        let target = resolve(&fake, &request(), &DentConfig::default()).await.unwrap();
        assert_eq!(target.container, "dent-debian-stable-slim");
    }

    #[tokio::test]
    async fn test_base_iteration_first_local_image() {
        let fake = FakeDocker::new();
        fake.add_image("alpine:latest").await;

        let target = resolve(&fake, &request(), &DentConfig::default()).await.unwrap();
        assert_eq!(target.container, "dent-alpine");
        assert_eq!(target.status, ContainerStatus::Missing);
        assert!(target.image_local);
    }

    #[tokio::test]
    async fn test_base_iteration_falls_back_to_first_candidate() {
        let fake = FakeDocker::new();
        let target = resolve(&fake, &request(), &DentConfig::default()).await.unwrap();
        assert_eq!(target.container, "dent-ubuntu");
        assert_eq!(target.image.as_deref(), Some("ubuntu:latest"));
        assert!(!target.image_local);
    }

    #[tokio::test]
    async fn test_base_flags_override_config() {
        let fake = FakeDocker::new();
        let req = EnterRequest { base_images: vec!["rockylinux:9".into()], ..request() };
        let target = resolve(&fake, &req, &DentConfig::default()).await.unwrap();
        assert_eq!(target.container, "dent-rockylinux-9");
    }

    #[tokio::test]
    async fn test_empty_candidates_is_config_error() {
        let fake = FakeDocker::new();
        let err = iterate_base_images(&fake, "dent-", &[]).await.unwrap_err();
        assert!(matches!(err, DentError::Config(_)));
    }
}
