//! Command pipeline for building assignment environment images.
//!
//! A fixed ordered sequence of stages — Verify, Write, Build, Publish —
//! each wrapped as a reversible command. The orchestrator drives forward
//! execution and, on failure, pops the undo stack in reverse order to
//! compensate for steps that already ran. The container engine offers no
//! multi-step transaction, so the pipeline approximates atomicity with
//! per-step compensations.

mod commands;
mod context;
mod orchestrator;

pub use commands::{
    BuildCommand, Command, PublishCommand, VerifyCommand, WriteDockerfileCommand,
};
pub use context::{BuildContext, CONTAINER_PORT, DOCKER_IO};
pub use orchestrator::{BuildManager, UndoStack};
