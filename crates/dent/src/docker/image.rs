//! Image domain — presence check and pull.

use super::client::{DockerClient, DockerError};
use crate::enter::naming::split_tag;
use futures_util::stream::StreamExt;

impl DockerClient {
    /// Whether `reference` is present in the local image store.
    pub async fn image_exists(&self, reference: &str) -> Result<bool, DockerError> {
        match self.client.inspect_image(reference).await {
            Ok(_) => Ok(true),
            Err(bollard::errors::Error::DockerResponseServerError { status_code: 404, .. }) => Ok(false),
            Err(e) => Err(DockerError::for_image(reference, e)),
        }
    }

    /// Pull an image from a registry. Returns when the pull is complete.
    pub async fn pull_image(&self, reference: &str) -> Result<(), DockerError> {
        use bollard::query_parameters::CreateImageOptions;

        let (repository, tag) = split_tag(reference);
        let options = Some(CreateImageOptions {
            from_image: Some(repository.to_string()),
            tag: tag.map(str::to_string),
            ..Default::default()
        });

        let mut stream = self.client.create_image(options, None, None);

        while let Some(result) = stream.next().await {
            match result {
                Ok(info) => {
                    tracing::debug!(image = %reference, status = ?info.status, "Image pull progress");
                }
                Err(e) => return Err(DockerError::for_image(reference, e)),
            }
        }

        Ok(())
    }
}
