//! Renderers that assemble Dockerfile instructions from configuration.
//!
//! Both renderers are pure: they return the instruction sequence and
//! leave tag derivation to [`dependency_tag`], which the verification
//! stage applies. Library iteration follows the configuration's
//! `BTreeMap` order, so output is byte-stable for a fixed configuration.

use crate::config::AssignmentEnvConfig;

use super::instruction::Instruction;

/// Working directory the build payload is copied into.
pub const CODE_RUNNER_DIR: &str = "code-runner";
/// Directory holding the per-language installation scripts.
pub const SCRIPTS_DIR: &str = "scripts";
/// Environment variable announcing the installed language to the runner.
pub const LANGUAGE_ENV_KEY: &str = "SUPPORTED_LANGUAGE";

/// Renders the full instruction sequence starting from the base image.
///
/// Used when no prebuilt language image exists: installs the language
/// via its installation script, then layers every library on top.
pub fn render_from_base_image(config: &AssignmentEnvConfig) -> Vec<Instruction> {
    let language = &config.deps.language;
    let mut instructions = vec![
        Instruction::From(config.base_image.clone()),
        Instruction::Copy {
            src: ".".to_string(),
            dest: format!("/{CODE_RUNNER_DIR}"),
        },
        Instruction::Run(format!(
            "./{SCRIPTS_DIR}/{}_{}.sh",
            language.name, language.version
        )),
        Instruction::Env {
            key: LANGUAGE_ENV_KEY.to_string(),
            value: language.name.clone(),
        },
    ];
    instructions.extend(library_instructions(config));
    instructions
}

/// Renders the instruction sequence starting from a prebuilt language image.
///
/// Used when the language image already exists and at least one library
/// dependency remains to layer on top of it.
pub fn render_from_language_image(
    config: &AssignmentEnvConfig,
    language_tag: &str,
) -> Vec<Instruction> {
    let mut instructions = vec![
        Instruction::From(language_tag.to_string()),
        Instruction::Copy {
            src: ".".to_string(),
            dest: format!("/{CODE_RUNNER_DIR}"),
        },
    ];
    instructions.extend(library_instructions(config));
    instructions
}

/// One `RUN <cmd> <lib>` per library, in lexicographic library order.
fn library_instructions(config: &AssignmentEnvConfig) -> impl Iterator<Item = Instruction> + '_ {
    config
        .deps
        .libraries
        .iter()
        .map(|(name, install)| Instruction::Run(format!("{} {}", install.cmd, name)))
}

/// Extends `tag` with the library names of `config`, `-`-joined.
///
/// The result doubles as a content-derived cache key: two configurations
/// with the same language and library set converge on the same tag, so a
/// later verification finds the image already built. An empty library set
/// leaves the tag unchanged.
pub fn dependency_tag(tag: &str, config: &AssignmentEnvConfig) -> String {
    if config.deps.libraries.is_empty() {
        return tag.to_string();
    }
    let suffix = config
        .deps
        .libraries
        .keys()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("-");
    format!("{tag}-{suffix}")
}
