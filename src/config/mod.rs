//! Assignment environment configuration.
//!
//! Loads and validates the declarative YAML description of a language
//! runtime: base image, language name/version, and library dependencies
//! with their installation commands.

mod assignment_env;
mod credentials;
mod validate;

pub use assignment_env::{AssignmentEnvConfig, Dependencies, LanguageInfo, LibraryInstall};
pub use credentials::{RegistryAuth, DOCKER_AUTH_PASSWORD, DOCKER_AUTH_USERNAME};
pub use validate::{validate, validate_language_support};
