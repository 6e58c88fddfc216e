//! Integration tests for the build pipeline.
//!
//! Drive the full command sequence against an in-process mock engine
//! that records calls and injects failures at chosen stages.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use envforge::config::{AssignmentEnvConfig, RegistryAuth};
use envforge::error::{EngineError, PipelineError};
use envforge::execution::ContainerEngine;
use envforge::pipeline::{BuildContext, BuildManager};

/// Call-recording engine with injectable failures.
#[derive(Default)]
struct MockEngine {
    calls: Mutex<Vec<String>>,
    language_image_exists: bool,
    exists_fails: bool,
    build_fails: bool,
    push_fails: bool,
    /// Remove reports the image as missing (nothing was built yet).
    image_missing_on_remove: bool,
}

impl MockEngine {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerEngine for MockEngine {
    async fn image_exists(&self, tag: &str) -> Result<bool, EngineError> {
        self.record(format!("exists:{tag}"));
        if self.exists_fails {
            Err(EngineError::SearchFailed("registry unreachable".to_string()))
        } else {
            Ok(self.language_image_exists)
        }
    }

    async fn build_image(
        &self,
        dockerfile_name: &str,
        _context_tar: Vec<u8>,
        tag: &str,
    ) -> Result<(), EngineError> {
        self.record(format!("build:{dockerfile_name}:{tag}"));
        if self.build_fails {
            Err(EngineError::BuildFailed("injected".to_string()))
        } else {
            Ok(())
        }
    }

    async fn push_image(&self, tag: &str, _auth: &RegistryAuth) -> Result<(), EngineError> {
        self.record(format!("push:{tag}"));
        if self.push_fails {
            Err(EngineError::PushFailed("injected".to_string()))
        } else {
            Ok(())
        }
    }

    async fn pull_image(&self, tag: &str, _auth: &RegistryAuth) -> Result<(), EngineError> {
        self.record(format!("pull:{tag}"));
        Ok(())
    }

    async fn remove_image(&self, tag: &str) -> Result<(), EngineError> {
        self.record(format!("remove:{tag}"));
        if self.image_missing_on_remove {
            Err(EngineError::ImageNotFound {
                tag: tag.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

const GCC_CONFIG: &str = r#"
baseImage: assignmentexec/code-runner:1.0
dependencies:
  lang: gcc
  langVersion: "7"
"#;

const GCC_LIBFOO_CONFIG: &str = r#"
baseImage: assignmentexec/code-runner:1.0
dependencies:
  lang: gcc
  langVersion: "7"
  lib:
    libfoo:
      cmd: apt-get install
"#;

struct Fixture {
    _dir: tempfile::TempDir,
    dockerfile: PathBuf,
    scripts: PathBuf,
}

/// A workspace with a scripts directory, as the build stage expects.
fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let scripts = dir.path().join("scripts");
    std::fs::create_dir(&scripts).unwrap();
    std::fs::write(scripts.join("gcc_7.sh"), "#!/bin/sh\n").unwrap();
    let dockerfile = dir.path().join("Dockerfile");
    Fixture {
        dockerfile,
        scripts,
        _dir: dir,
    }
}

fn manager(engine: &Arc<MockEngine>, yaml: &str, fx: &Fixture, publish: bool) -> BuildManager {
    let config = AssignmentEnvConfig::from_yaml_str(yaml).unwrap();
    let auth = RegistryAuth::new("assignmentexec", "secret");
    let context = BuildContext::new(
        config.language_image_tag(&auth.username),
        &fx.dockerfile,
        auth,
        publish,
    )
    .unwrap()
    .with_scripts_dir(&fx.scripts);
    let engine: Arc<dyn ContainerEngine> = engine.clone();
    BuildManager::new(engine, Arc::new(config), context)
}

#[tokio::test]
async fn test_fresh_build_and_publish() {
    let fx = fixture();
    let engine = Arc::new(MockEngine::default());
    let mut pipeline = manager(&engine, GCC_CONFIG, &fx, true);

    pipeline.execute().await.unwrap();

    assert_eq!(
        engine.calls(),
        vec![
            "exists:assignmentexec/gcc7",
            "build:Dockerfile:assignmentexec/gcc7",
            "push:docker.io/assignmentexec/gcc7",
        ]
    );

    // No libraries: the language tag carries no dependency suffix.
    assert_eq!(pipeline.context().image_tag, "assignmentexec/gcc7");

    let dockerfile = std::fs::read_to_string(&fx.dockerfile).unwrap();
    assert_eq!(
        dockerfile,
        "FROM assignmentexec/code-runner:1.0\n\
         COPY . /code-runner\n\
         RUN ./scripts/gcc_7.sh\n\
         ENV SUPPORTED_LANGUAGE gcc\n"
    );
}

#[tokio::test]
async fn test_language_image_layering_extends_tag() {
    let fx = fixture();
    let engine = Arc::new(MockEngine {
        language_image_exists: true,
        ..Default::default()
    });
    let mut pipeline = manager(&engine, GCC_LIBFOO_CONFIG, &fx, false);

    pipeline.execute().await.unwrap();

    assert_eq!(pipeline.context().image_tag, "assignmentexec/gcc7-libfoo");
    assert_eq!(
        engine.calls(),
        vec![
            "exists:assignmentexec/gcc7",
            "build:Dockerfile:assignmentexec/gcc7-libfoo",
        ]
    );

    let dockerfile = std::fs::read_to_string(&fx.dockerfile).unwrap();
    assert_eq!(
        dockerfile,
        "FROM assignmentexec/gcc7\nCOPY . /code-runner\nRUN apt-get install libfoo\n"
    );
}

#[tokio::test]
async fn test_complete_image_pulls_instead_of_building() {
    let fx = fixture();
    let engine = Arc::new(MockEngine {
        language_image_exists: true,
        ..Default::default()
    });
    let mut pipeline = manager(&engine, GCC_CONFIG, &fx, true);

    pipeline.execute().await.unwrap();

    // Build never runs; pull runs exactly once; publish stays a no-op
    // even though it was requested.
    assert_eq!(
        engine.calls(),
        vec![
            "exists:assignmentexec/gcc7",
            "pull:docker.io/assignmentexec/gcc7",
        ]
    );
    assert!(pipeline.context().image_already_complete);
    assert!(!fx.dockerfile.exists());
}

#[tokio::test]
async fn test_publish_not_requested_never_pushes() {
    let fx = fixture();
    let engine = Arc::new(MockEngine::default());
    let mut pipeline = manager(&engine, GCC_CONFIG, &fx, false);

    pipeline.execute().await.unwrap();

    assert!(engine.calls().iter().all(|call| !call.starts_with("push:")));
}

#[tokio::test]
async fn test_verification_error_falls_back_to_base_image() {
    let fx = fixture();
    let engine = Arc::new(MockEngine {
        exists_fails: true,
        ..Default::default()
    });
    let mut pipeline = manager(&engine, GCC_CONFIG, &fx, false);

    pipeline.execute().await.unwrap();

    let dockerfile = std::fs::read_to_string(&fx.dockerfile).unwrap();
    assert!(dockerfile.starts_with("FROM assignmentexec/code-runner:1.0\n"));
}

#[tokio::test]
async fn test_build_failure_rolls_back_dockerfile() {
    let fx = fixture();
    let engine = Arc::new(MockEngine {
        build_fails: true,
        // The failed build produced no image, so the compensating
        // remove reports it missing; rollback must tolerate that.
        image_missing_on_remove: true,
        ..Default::default()
    });
    let mut pipeline = manager(&engine, GCC_CONFIG, &fx, true);

    let err = pipeline.execute().await.unwrap_err();
    assert!(matches!(err, PipelineError::Stage { stage: "build", .. }));

    // Every executed command was compensated and the stack drained.
    assert_eq!(pipeline.pending_undos(), 0);
    assert!(!fx.dockerfile.exists());
    assert_eq!(
        engine.calls(),
        vec![
            "exists:assignmentexec/gcc7",
            "build:Dockerfile:assignmentexec/gcc7",
            "remove:assignmentexec/gcc7",
        ]
    );
}

#[tokio::test]
async fn test_push_failure_removes_local_image() {
    let fx = fixture();
    let engine = Arc::new(MockEngine {
        push_fails: true,
        ..Default::default()
    });
    let mut pipeline = manager(&engine, GCC_CONFIG, &fx, true);

    let err = pipeline.execute().await.unwrap_err();
    assert!(matches!(err, PipelineError::Stage { stage: "publish", .. }));

    assert_eq!(pipeline.pending_undos(), 0);
    assert!(!fx.dockerfile.exists());
    // Publish undo and build undo both remove the local image; the
    // second remove is the idempotent repeat.
    assert_eq!(
        engine.calls(),
        vec![
            "exists:assignmentexec/gcc7",
            "build:Dockerfile:assignmentexec/gcc7",
            "push:docker.io/assignmentexec/gcc7",
            "remove:assignmentexec/gcc7",
            "remove:assignmentexec/gcc7",
        ]
    );
}

#[tokio::test]
async fn test_write_undo_is_idempotent() {
    use envforge::pipeline::{Command, WriteDockerfileCommand};

    let fx = fixture();
    let config = AssignmentEnvConfig::from_yaml_str(GCC_CONFIG).unwrap();
    let auth = RegistryAuth::new("assignmentexec", "secret");
    let mut ctx = BuildContext::new(
        config.language_image_tag(&auth.username),
        &fx.dockerfile,
        auth,
        false,
    )
    .unwrap();
    ctx.rendered = envforge::docker::render_from_base_image(&config);

    let write = WriteDockerfileCommand::new();
    write.execute(&mut ctx).await.unwrap();
    assert!(fx.dockerfile.exists());

    write.undo(&mut ctx).await.unwrap();
    assert!(!fx.dockerfile.exists());

    // Undoing again, with nothing left to delete, still succeeds.
    write.undo(&mut ctx).await.unwrap();
}
