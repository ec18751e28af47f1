use std::path::Path;

use super::env::EnvSource;
use super::file::FileSource;
use super::source::{merge_at_path, ConfigSource};
use super::{ConfigError, ConfigTree};

/// Builder for loading configuration from TOML files and the environment.
///
/// Sources are merged in registration order, with later sources overriding
/// earlier ones at the same path. Nested tables are merged recursively; other
/// values (including arrays) are replaced entirely.
///
/// ## Example
///
/// ```no_run
/// use app_essentials::Config;
///
/// let tree = Config::builder()
///     .with_file("appsettings.toml", true)
///     .with_file("appsettings.Development.toml", false)
///     .with_env(None, "__")
///     .build()?;
///
/// let level = tree.value("Logging.minimum_level");
/// # Ok::<(), app_essentials::ConfigError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct Config {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl Config {
    /// Creates a new configuration builder.
    pub fn builder() -> Self {
        Self::default()
    }

    /// Adds a TOML file to be loaded.
    ///
    /// If `required` is `true`, the build fails with
    /// [`ConfigError::MissingSource`] if the file doesn't exist.
    pub fn with_file(self, path: impl AsRef<Path>, required: bool) -> Self {
        self.with_source(FileSource::new(path, required))
    }

    /// Adds environment variables, optionally restricted to those starting
    /// with `prefix` followed by `separator`.
    ///
    /// ```no_run
    /// # use app_essentials::Config;
    /// // With MYAPP__Database__Host=localhost
    /// let tree = Config::builder()
    ///     .with_file("appsettings.toml", true)
    ///     .with_env(Some("MYAPP".into()), "__")
    ///     .build()?;
    /// assert_eq!(tree.value("Database.Host").as_deref(), Some("localhost"));
    /// # Ok::<(), app_essentials::ConfigError>(())
    /// ```
    pub fn with_env(self, prefix: Option<String>, separator: impl Into<String>) -> Self {
        self.with_source(EnvSource::new(prefix, separator))
    }

    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Loads every source in order and merges the result into one tree.
    pub fn build(self) -> Result<ConfigTree, ConfigError> {
        let mut merged = toml::Table::new();

        for source in &self.sources {
            for entry in source.entries()? {
                merge_at_path(&mut merged, &entry.path, entry.value);
            }
        }

        Ok(ConfigTree::new(merged))
    }
}
