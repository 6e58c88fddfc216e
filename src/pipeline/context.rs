//! Shared mutable state of one pipeline invocation.

use std::path::{Path, PathBuf};

use crate::config::RegistryAuth;
use crate::docker::{Instruction, SCRIPTS_DIR};
use crate::error::{ConfigError, FieldError};

/// Registry host prefix used when pulling and pushing images.
pub const DOCKER_IO: &str = "docker.io";
/// Port the code-runner server listens on inside the container.
pub const CONTAINER_PORT: u16 = 52453;

/// Parameters and intermediate results shared by the pipeline stages.
///
/// Constructed once per invocation. Immutable except for the fields the
/// verification stage owns: only verification may extend `image_tag`
/// (appending the dependency suffix) and set `rendered` /
/// `image_already_complete`. Later stages read, never write, those
/// fields; the write stage clears `rendered` on undo.
#[derive(Debug)]
pub struct BuildContext {
    /// Tag the image is built, pulled and removed under.
    pub image_tag: String,
    /// Path the generated Dockerfile is written to.
    pub dockerfile_path: PathBuf,
    /// Directory holding the language installation scripts.
    pub scripts_dir: PathBuf,
    /// Registry credentials, passed through to the engine.
    pub auth: RegistryAuth,
    /// Whether the publish stage should push the image.
    pub publish_requested: bool,
    /// Instructions rendered by the verification stage.
    pub rendered: Vec<Instruction>,
    /// True when the target image already exists with all dependencies,
    /// so downstream stages pull instead of write-and-build.
    pub image_already_complete: bool,
}

impl BuildContext {
    /// Creates the context for one pipeline invocation.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `image_tag` is empty — the
    /// tag must be usable in engine calls from the first stage on.
    pub fn new(
        image_tag: impl Into<String>,
        dockerfile_path: impl Into<PathBuf>,
        auth: RegistryAuth,
        publish_requested: bool,
    ) -> Result<Self, ConfigError> {
        let image_tag = image_tag.into();
        if image_tag.trim().is_empty() {
            return Err(ConfigError::Invalid(vec![FieldError::new(
                "imageTag",
                "must not be empty",
            )]));
        }
        Ok(Self {
            image_tag,
            dockerfile_path: dockerfile_path.into(),
            scripts_dir: PathBuf::from(SCRIPTS_DIR),
            auth,
            publish_requested,
            rendered: Vec::new(),
            image_already_complete: false,
        })
    }

    /// Overrides the installation scripts directory.
    pub fn with_scripts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scripts_dir = dir.into();
        self
    }

    /// The image reference used for registry pulls and pushes.
    pub fn registry_reference(&self) -> String {
        format!("{DOCKER_IO}/{}", self.image_tag)
    }

    /// Name of the Dockerfile inside the build context archive.
    pub fn dockerfile_name(&self) -> &str {
        self.dockerfile_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("Dockerfile")
    }

    /// The command a user runs to start the built environment.
    pub fn run_command(&self) -> String {
        format!(
            "docker run --publish {CONTAINER_PORT}:{CONTAINER_PORT} {} -port {CONTAINER_PORT}",
            self.image_tag
        )
    }

    /// Packages the build payload as an in-memory tar archive.
    ///
    /// The archive holds the installation scripts under `scripts/` plus
    /// the Dockerfile under its file name, which is what the RUN
    /// instructions and the engine's build call expect. Nothing is
    /// written to disk, so no archive can be left behind on any path.
    pub fn build_context_tar(&self) -> std::io::Result<Vec<u8>> {
        let mut builder = tar::Builder::new(Vec::new());
        builder.append_dir_all(SCRIPTS_DIR, &self.scripts_dir)?;

        let mut dockerfile = std::fs::File::open(&self.dockerfile_path)?;
        builder.append_file(Path::new(self.dockerfile_name()), &mut dockerfile)?;

        builder.into_inner()
    }
}
