use std::path::{Path, PathBuf};

use crate::config::Config;

pub const DEFAULT_BASE_NAME: &str = "appsettings";
pub const DEFAULT_ENVIRONMENT_VARIABLE: &str = "APP_ENVIRONMENT";
pub const DEFAULT_ENVIRONMENT: &str = "Production";
pub const DEFAULT_ENV_SEPARATOR: &str = "__";

/// Whether `{base_name}.{environment}.toml` must exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EnvironmentFile {
    Required,
    #[default]
    Optional,
}

/// Where and how [`Settings`](super::Settings) are loaded.
///
/// Sources are layered in a fixed order: the base file, the file for the
/// deployment environment, then environment variables.
///
/// ## Example
///
/// ```
/// use app_essentials::{EnvironmentFile, SettingsOptions};
///
/// let options = SettingsOptions::default()
///     .with_base_dir("config")
///     .with_environment("Development")
///     .with_environment_file(EnvironmentFile::Required)
///     .with_env_prefix("MYAPP");
///
/// assert_eq!(options.environment(), "Development");
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct SettingsOptions {
    base_dir: PathBuf,
    base_name: String,
    environment_variable: String,
    default_environment: String,
    environment: Option<String>,
    environment_file: EnvironmentFile,
    env_prefix: Option<String>,
    env_separator: String,
}

impl Default for SettingsOptions {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            base_name: DEFAULT_BASE_NAME.to_string(),
            environment_variable: DEFAULT_ENVIRONMENT_VARIABLE.to_string(),
            default_environment: DEFAULT_ENVIRONMENT.to_string(),
            environment: None,
            environment_file: EnvironmentFile::default(),
            env_prefix: None,
            env_separator: DEFAULT_ENV_SEPARATOR.to_string(),
        }
    }
}

impl SettingsOptions {
    pub fn with_base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.base_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_base_name(mut self, name: impl Into<String>) -> Self {
        self.base_name = name.into();
        self
    }

    /// Names the variable that selects the deployment environment.
    pub fn with_environment_variable(mut self, name: impl Into<String>) -> Self {
        self.environment_variable = name.into();
        self
    }

    /// Environment used when the selecting variable is unset.
    pub fn with_default_environment(mut self, name: impl Into<String>) -> Self {
        self.default_environment = name.into();
        self
    }

    /// Pins the deployment environment, bypassing the selecting variable.
    pub fn with_environment(mut self, name: impl Into<String>) -> Self {
        self.environment = Some(name.into());
        self
    }

    pub fn with_environment_file(mut self, requirement: EnvironmentFile) -> Self {
        self.environment_file = requirement;
        self
    }

    /// Restricts environment overrides to variables named `{prefix}{separator}...`.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// An empty separator cannot split a variable name and is ignored.
    pub fn with_env_separator(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        if !separator.is_empty() {
            self.env_separator = separator;
        }
        self
    }

    /// Resolves the deployment environment name.
    pub fn environment(&self) -> String {
        if let Some(environment) = &self.environment {
            return environment.clone();
        }
        std::env::var(&self.environment_variable)
            .ok()
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| self.default_environment.clone())
    }

    pub fn base_file(&self) -> PathBuf {
        self.base_dir.join(format!("{}.toml", self.base_name))
    }

    pub fn environment_file(&self, environment: &str) -> PathBuf {
        self.base_dir
            .join(format!("{}.{}.toml", self.base_name, environment))
    }

    pub(crate) fn config(&self, environment: &str) -> Config {
        Config::builder()
            .with_file(self.base_file(), true)
            .with_file(
                self.environment_file(environment),
                self.environment_file == EnvironmentFile::Required,
            )
            .with_env(self.env_prefix.clone(), self.env_separator.as_str())
    }
}
