//! Docker implementation of the container engine gateway using bollard.

use async_trait::async_trait;
use bollard::auth::DockerCredentials;
use bollard::image::{BuildImageOptions, CreateImageOptions, PushImageOptions, RemoveImageOptions};
use bollard::Docker;
use futures::StreamExt;
use tracing::debug;

use crate::config::RegistryAuth;
use crate::error::EngineError;

use super::engine::ContainerEngine;

/// Container engine backed by a local Docker daemon.
pub struct DockerEngine {
    docker: Docker,
}

impl DockerEngine {
    /// Connects to the local Docker daemon.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DaemonUnavailable`] if the daemon is not
    /// accessible.
    pub fn connect() -> Result<Self, EngineError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| EngineError::DaemonUnavailable(e.to_string()))?;
        Ok(Self { docker })
    }

    /// Creates an engine from an existing bollard Docker instance.
    pub fn from_docker(docker: Docker) -> Self {
        Self { docker }
    }
}

fn credentials(auth: &RegistryAuth) -> DockerCredentials {
    DockerCredentials {
        username: Some(auth.username.clone()),
        password: Some(auth.password.clone()),
        ..Default::default()
    }
}

fn is_not_found(err: &bollard::errors::Error) -> bool {
    matches!(
        err,
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404,
            ..
        }
    )
}

#[async_trait]
impl ContainerEngine for DockerEngine {
    async fn image_exists(&self, tag: &str) -> Result<bool, EngineError> {
        match self.docker.inspect_image(tag).await {
            Ok(_) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(EngineError::SearchFailed(e.to_string())),
        }
    }

    async fn build_image(
        &self,
        dockerfile_name: &str,
        context_tar: Vec<u8>,
        tag: &str,
    ) -> Result<(), EngineError> {
        let options = BuildImageOptions {
            dockerfile: dockerfile_name,
            t: tag,
            rm: true,
            forcerm: true,
            ..Default::default()
        };

        let mut stream = self
            .docker
            .build_image(options, None, Some(context_tar.into()));

        while let Some(message) = stream.next().await {
            let info = message.map_err(|e| EngineError::BuildFailed(e.to_string()))?;
            if let Some(output) = info.stream {
                // Daemon build steps go to stdout, matching `docker build`.
                print!("{output}");
            }
            if let Some(error) = info.error {
                return Err(EngineError::BuildFailed(error));
            }
            if let Some(detail) = info.error_detail {
                let message = detail.message.unwrap_or_else(|| "unknown error".to_string());
                return Err(EngineError::BuildFailed(message));
            }
        }

        Ok(())
    }

    async fn push_image(&self, tag: &str, auth: &RegistryAuth) -> Result<(), EngineError> {
        let mut stream = self.docker.push_image(
            tag,
            None::<PushImageOptions<String>>,
            Some(credentials(auth)),
        );

        while let Some(message) = stream.next().await {
            let info = message.map_err(|e| EngineError::PushFailed(e.to_string()))?;
            if let Some(error) = info.error {
                return Err(EngineError::PushFailed(error));
            }
            if let Some(status) = info.status {
                debug!(%tag, "push: {status}");
            }
        }

        Ok(())
    }

    async fn pull_image(&self, tag: &str, auth: &RegistryAuth) -> Result<(), EngineError> {
        let options = CreateImageOptions {
            from_image: tag,
            ..Default::default()
        };

        let mut stream = self
            .docker
            .create_image(Some(options), None, Some(credentials(auth)));

        while let Some(message) = stream.next().await {
            let info = message.map_err(|e| EngineError::PullFailed(e.to_string()))?;
            if let Some(error) = info.error {
                return Err(EngineError::PullFailed(error));
            }
            if let Some(status) = info.status {
                debug!(%tag, "pull: {status}");
            }
        }

        Ok(())
    }

    async fn remove_image(&self, tag: &str) -> Result<(), EngineError> {
        let options = RemoveImageOptions {
            force: true,
            ..Default::default()
        };

        match self.docker.remove_image(tag, Some(options), None).await {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => Err(EngineError::ImageNotFound {
                tag: tag.to_string(),
            }),
            Err(e) => Err(EngineError::RemoveFailed(e.to_string())),
        }
    }
}
