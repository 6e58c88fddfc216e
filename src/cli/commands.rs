//! CLI definition and the end-to-end build entry point.

use std::sync::Arc;

use clap::Parser;
use tracing::info;

use crate::config::{validate_language_support, AssignmentEnvConfig, RegistryAuth};
use crate::execution::DockerEngine;
use crate::pipeline::{BuildContext, BuildManager};

/// Assignment environment image builder.
#[derive(Parser)]
#[command(name = "envforge")]
#[command(about = "Render, build and publish assignment environment images")]
#[command(version)]
#[command(
    long_about = "envforge turns a declarative description of a language runtime \
(base image, language, library dependencies) into a container image: it renders a \
Dockerfile, builds the image against the local Docker daemon and optionally pushes \
it to the registry.\n\nRegistry credentials are read from DOCKER_AUTH_USERNAME and \
DOCKER_AUTH_PASSWORD."
)]
pub struct Cli {
    /// Push the built image to the registry.
    #[arg(long = "publishImage")]
    pub publish_image: bool,

    /// Assignment environment configuration file.
    #[arg(long = "assignmentEnvConfig", default_value = "assignment-env.yaml")]
    pub env_config: String,

    /// Location of the Dockerfile to generate.
    #[arg(long, default_value = "Dockerfile")]
    pub dockerfile: String,

    /// Directory holding the language installation scripts.
    #[arg(long, default_value = "scripts")]
    pub scripts_dir: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    pub log_level: String,
}

/// Parses CLI arguments.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Runs one assignment environment build end to end.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let config = AssignmentEnvConfig::from_yaml_file(&cli.env_config)?;
    validate_language_support(&config, &cli.scripts_dir)?;

    let auth = RegistryAuth::from_env()?;
    let language_tag = config.language_image_tag(&auth.username);
    let context = BuildContext::new(language_tag, &cli.dockerfile, auth, cli.publish_image)?
        .with_scripts_dir(&cli.scripts_dir);

    let engine = Arc::new(DockerEngine::connect()?);
    let mut manager = BuildManager::new(engine, Arc::new(config), context);
    manager.execute().await?;

    info!(
        tag = %manager.context().image_tag,
        "assignment environment image ready"
    );
    Ok(())
}
