//! Reversible pipeline stages.
//!
//! Each stage pairs its forward action with a compensating undo. All
//! conditional logic (pull-vs-build, publish gating) lives inside the
//! stages; the orchestrator just sequences them.

use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::config::AssignmentEnvConfig;
use crate::docker::{
    dependency_tag, render_from_base_image, render_from_language_image, render_instructions,
};
use crate::error::{EngineError, StageError};
use crate::execution::ContainerEngine;

use super::context::BuildContext;

/// A reversible pipeline step.
#[async_trait]
pub trait Command: Send + Sync {
    /// Stage name used when wrapping errors and logging.
    fn name(&self) -> &'static str;

    /// Performs the stage's forward action.
    async fn execute(&self, ctx: &mut BuildContext) -> Result<(), StageError>;

    /// Reverses the observable effect of a previous `execute`.
    ///
    /// Undo actions are idempotent: compensating for work that never
    /// happened (or was already compensated) succeeds.
    async fn undo(&self, ctx: &mut BuildContext) -> Result<(), StageError>;
}

/// Decides which instruction layer to render.
///
/// Checks the engine for a prebuilt language image and renders either
/// from the base image, from the language image, or nothing at all when
/// the target image is already complete. This is the only stage allowed
/// to extend `BuildContext::image_tag`.
pub struct VerifyCommand {
    engine: Arc<dyn ContainerEngine>,
    config: Arc<AssignmentEnvConfig>,
}

impl VerifyCommand {
    pub fn new(engine: Arc<dyn ContainerEngine>, config: Arc<AssignmentEnvConfig>) -> Self {
        Self { engine, config }
    }
}

#[async_trait]
impl Command for VerifyCommand {
    fn name(&self) -> &'static str {
        "verify"
    }

    async fn execute(&self, ctx: &mut BuildContext) -> Result<(), StageError> {
        // A failed lookup counts as absent: registry flakiness should
        // degrade to a fresh build, not abort the pipeline.
        let language_image_exists = match self.engine.image_exists(&ctx.image_tag).await {
            Ok(exists) => exists,
            Err(err) => {
                warn!(tag = %ctx.image_tag, "image lookup failed, assuming absent: {err}");
                false
            }
        };

        if !language_image_exists {
            ctx.rendered = render_from_base_image(&self.config);
        } else if !self.config.deps.libraries.is_empty() {
            ctx.rendered = render_from_language_image(&self.config, &ctx.image_tag);
        }

        ctx.image_already_complete = ctx.rendered.is_empty();
        if !ctx.image_already_complete {
            ctx.image_tag = dependency_tag(&ctx.image_tag, &self.config);
        }
        info!(
            tag = %ctx.image_tag,
            complete = ctx.image_already_complete,
            "verification finished"
        );
        Ok(())
    }

    async fn undo(&self, _ctx: &mut BuildContext) -> Result<(), StageError> {
        // Verification has no observable effect to reverse.
        Ok(())
    }
}

/// Persists the rendered instructions to the Dockerfile location.
#[derive(Default)]
pub struct WriteDockerfileCommand;

impl WriteDockerfileCommand {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Command for WriteDockerfileCommand {
    fn name(&self) -> &'static str {
        "write-dockerfile"
    }

    async fn execute(&self, ctx: &mut BuildContext) -> Result<(), StageError> {
        if ctx.image_already_complete {
            return Ok(());
        }

        let text = render_instructions(&ctx.rendered);
        let mut file = std::fs::File::create(&ctx.dockerfile_path)?;
        file.write_all(text.as_bytes())?;
        // Flush through to disk so close errors surface here instead of
        // being swallowed by drop.
        file.sync_all()?;
        info!(path = %ctx.dockerfile_path.display(), "dockerfile written");
        Ok(())
    }

    async fn undo(&self, ctx: &mut BuildContext) -> Result<(), StageError> {
        ctx.rendered.clear();
        match std::fs::remove_file(&ctx.dockerfile_path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

/// Ensures the image is present locally: builds it, or pulls it when the
/// verification stage found it already complete.
pub struct BuildCommand {
    engine: Arc<dyn ContainerEngine>,
}

impl BuildCommand {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Command for BuildCommand {
    fn name(&self) -> &'static str {
        "build"
    }

    async fn execute(&self, ctx: &mut BuildContext) -> Result<(), StageError> {
        if ctx.image_already_complete {
            info!(tag = %ctx.image_tag, "image already complete, pulling");
            self.engine
                .pull_image(&ctx.registry_reference(), &ctx.auth)
                .await?;
            return Ok(());
        }

        let context_tar = ctx.build_context_tar()?;
        info!(tag = %ctx.image_tag, "building image");
        self.engine
            .build_image(ctx.dockerfile_name(), context_tar, &ctx.image_tag)
            .await?;
        Ok(())
    }

    async fn undo(&self, ctx: &mut BuildContext) -> Result<(), StageError> {
        remove_local_image(self.engine.as_ref(), ctx).await
    }
}

/// Pushes a freshly built image to the registry when requested.
pub struct PublishCommand {
    engine: Arc<dyn ContainerEngine>,
}

impl PublishCommand {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self { engine }
    }
}

#[async_trait]
impl Command for PublishCommand {
    fn name(&self) -> &'static str {
        "publish"
    }

    async fn execute(&self, ctx: &mut BuildContext) -> Result<(), StageError> {
        if ctx.image_already_complete || !ctx.publish_requested {
            return Ok(());
        }

        self.engine
            .push_image(&ctx.registry_reference(), &ctx.auth)
            .await?;
        println!("\nFollowing is the command for starting {}\n", ctx.image_tag);
        println!("{}", ctx.run_command());
        Ok(())
    }

    async fn undo(&self, ctx: &mut BuildContext) -> Result<(), StageError> {
        // A failed publish leaves an unpublished local image behind,
        // cleaned up exactly as a failed build would be.
        remove_local_image(self.engine.as_ref(), ctx).await
    }
}

/// Force-removes the locally built image by tag.
///
/// The pipeline does not track image consumers, so removal is
/// unconditional; a missing image counts as already removed so rollback
/// of a stage that failed before producing the image still succeeds.
async fn remove_local_image(
    engine: &dyn ContainerEngine,
    ctx: &BuildContext,
) -> Result<(), StageError> {
    match engine.remove_image(&ctx.image_tag).await {
        Ok(()) => Ok(()),
        Err(EngineError::ImageNotFound { .. }) => Ok(()),
        Err(err) => Err(err.into()),
    }
}
