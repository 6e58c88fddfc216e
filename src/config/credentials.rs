//! Registry authentication data.

use crate::error::ConfigError;

/// Environment variable holding the registry username.
pub const DOCKER_AUTH_USERNAME: &str = "DOCKER_AUTH_USERNAME";
/// Environment variable holding the registry password.
pub const DOCKER_AUTH_PASSWORD: &str = "DOCKER_AUTH_PASSWORD";

/// Username and password for the image registry.
///
/// Opaque to the pipeline; passed through to the container engine on
/// push and pull calls.
#[derive(Debug, Clone)]
pub struct RegistryAuth {
    pub username: String,
    pub password: String,
}

impl RegistryAuth {
    /// Creates authentication data from explicit values.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reads authentication data from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let username = std::env::var(DOCKER_AUTH_USERNAME)
            .map_err(|_| ConfigError::MissingEnvVar(DOCKER_AUTH_USERNAME.to_string()))?;
        let password = std::env::var(DOCKER_AUTH_PASSWORD)
            .map_err(|_| ConfigError::MissingEnvVar(DOCKER_AUTH_PASSWORD.to_string()))?;
        Ok(Self { username, password })
    }
}
