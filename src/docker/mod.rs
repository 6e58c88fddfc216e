//! Dockerfile generation for assignment environment images.
//!
//! Provides the typed instruction model and the renderers that assemble
//! Dockerfile content from an assignment environment configuration.

mod dockerfile;
mod instruction;

pub use dockerfile::{
    dependency_tag, render_from_base_image, render_from_language_image, CODE_RUNNER_DIR,
    LANGUAGE_ENV_KEY, SCRIPTS_DIR,
};
pub use instruction::{render_instructions, Instruction};
