//! In-memory form of the assignment environment YAML configuration.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Validated configuration for one assignment environment image.
///
/// Deserialized from a YAML file of the form:
///
/// ```yaml
/// baseImage: assignmentexec/code-runner:1.0
/// dependencies:
///   lang: gcc
///   langVersion: "7"
///   lib:
///     libfoo:
///       cmd: apt-get install
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentEnvConfig {
    /// Registry reference used when no prebuilt language image exists.
    #[serde(rename = "baseImage")]
    pub base_image: String,
    /// Language and library dependencies to layer on top.
    #[serde(rename = "dependencies")]
    pub deps: Dependencies,
}

/// Language information plus library dependencies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dependencies {
    /// The language runtime to install.
    #[serde(flatten)]
    pub language: LanguageInfo,
    /// Library name to installation command, ordered lexicographically.
    ///
    /// A `BTreeMap` keeps iteration order stable so the rendered
    /// Dockerfile and the derived image tag are reproducible across runs.
    #[serde(rename = "lib", default)]
    pub libraries: BTreeMap<String, LibraryInstall>,
}

/// Name and version of the language runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageInfo {
    #[serde(rename = "lang")]
    pub name: String,
    #[serde(rename = "langVersion")]
    pub version: String,
}

/// Installation command for a single library dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryInstall {
    /// Shell install command; the library name is appended when rendered.
    pub cmd: String,
}

impl AssignmentEnvConfig {
    /// Reads, parses and validates the configuration file at `path`.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Parses and validates configuration from a YAML string.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(contents)?;
        let errors = super::validate(&config);
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// Returns the registry tag of the prebuilt image for this language,
    /// e.g. `assignmentexec/gcc7` for user "assignmentexec".
    pub fn language_image_tag(&self, username: &str) -> String {
        format!(
            "{}/{}{}",
            username, self.deps.language.name, self.deps.language.version
        )
    }
}
