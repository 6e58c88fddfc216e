//! Capability interface the build pipeline requires from a container engine.

use async_trait::async_trait;

use crate::config::RegistryAuth;
use crate::error::EngineError;

/// Image operations the pipeline depends on.
///
/// Implementations are expected to be side-effect faithful: a successful
/// `build_image` leaves a local image under `tag`, and `remove_image`
/// reports [`EngineError::ImageNotFound`] when there is nothing to
/// remove, which undo paths treat as already-done.
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Returns whether an image with the given tag is available.
    async fn image_exists(&self, tag: &str) -> Result<bool, EngineError>;

    /// Builds an image from a tar build context.
    ///
    /// `dockerfile_name` is the path of the Dockerfile inside the
    /// archive; the built image is tagged with `tag`.
    async fn build_image(
        &self,
        dockerfile_name: &str,
        context_tar: Vec<u8>,
        tag: &str,
    ) -> Result<(), EngineError>;

    /// Pushes a local image to the registry.
    async fn push_image(&self, tag: &str, auth: &RegistryAuth) -> Result<(), EngineError>;

    /// Pulls an image from the registry.
    async fn pull_image(&self, tag: &str, auth: &RegistryAuth) -> Result<(), EngineError>;

    /// Removes a local image, even if containers still reference it.
    async fn remove_image(&self, tag: &str) -> Result<(), EngineError>;
}
