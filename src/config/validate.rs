//! Pure validation for the assignment environment configuration.
//!
//! Validation returns the full list of field errors rather than stopping
//! at the first one, so a user can fix the whole file in one pass.

use std::path::Path;

use crate::error::{ConfigError, FieldError};

use super::AssignmentEnvConfig;

/// Checks every required field of `config` and returns all violations.
///
/// An empty vector means the configuration is valid.
pub fn validate(config: &AssignmentEnvConfig) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if config.base_image.trim().is_empty() {
        errors.push(FieldError::new("baseImage", "must not be empty"));
    }
    if config.deps.language.name.trim().is_empty() {
        errors.push(FieldError::new("dependencies.lang", "must not be empty"));
    }
    if config.deps.language.version.trim().is_empty() {
        errors.push(FieldError::new(
            "dependencies.langVersion",
            "must not be empty",
        ));
    }

    for (name, install) in &config.deps.libraries {
        if name.trim().is_empty() {
            errors.push(FieldError::new(
                "dependencies.lib",
                "library name must not be empty",
            ));
        }
        if install.cmd.trim().is_empty() {
            errors.push(FieldError::new(
                format!("dependencies.lib.{name}.cmd"),
                "installation command must not be empty",
            ));
        }
    }

    errors
}

/// Checks that an installation script exists for the configured language.
///
/// The script is expected at `<scripts_dir>/<lang>_<version>.sh`; a missing
/// script means the language is not supported by this deployment.
pub fn validate_language_support(
    config: &AssignmentEnvConfig,
    scripts_dir: impl AsRef<Path>,
) -> Result<(), ConfigError> {
    let language = &config.deps.language;
    let script = scripts_dir
        .as_ref()
        .join(format!("{}_{}.sh", language.name, language.version));
    if script.is_file() {
        Ok(())
    } else {
        Err(ConfigError::UnsupportedLanguage {
            name: language.name.clone(),
            version: language.version.clone(),
            script: script.display().to_string(),
        })
    }
}
