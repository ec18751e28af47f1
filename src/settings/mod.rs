//! Application settings: the process configuration tree and typed lookups.

mod key;
mod options;

use std::str::FromStr;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::ConfigTree;
use crate::Error;

pub use key::Key;
pub use options::{
    EnvironmentFile, SettingsOptions, DEFAULT_BASE_NAME, DEFAULT_ENVIRONMENT,
    DEFAULT_ENVIRONMENT_VARIABLE, DEFAULT_ENV_SEPARATOR,
};

/// A loaded configuration tree and the environment it was loaded for.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    environment: String,
    root: ConfigTree,
}

impl Settings {
    /// Loads settings from the sources described by `options`.
    ///
    /// Fails with [`ConfigError::MissingSource`](crate::ConfigError::MissingSource)
    /// when the base file (or a required environment file) is absent.
    pub fn load(options: &SettingsOptions) -> Result<Self, Error> {
        let environment = options.environment();
        tracing::debug!(%environment, base = %options.base_file().display(), "loading settings");
        let root = options.config(&environment).build()?;
        Ok(Self { environment, root })
    }

    pub fn from_tree(environment: impl Into<String>, root: ConfigTree) -> Self {
        Self {
            environment: environment.into(),
            root,
        }
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn root(&self) -> &ConfigTree {
        &self.root
    }

    /// Raw string value at `key`; `None` when absent or not a scalar.
    pub fn value(&self, key: &Key) -> Option<String> {
        self.root.value(key.as_str())
    }

    /// Value at `key` parsed as `V`.
    ///
    /// Absent and unparsable values both read as `None`.
    pub fn typed_value<V: FromStr>(&self, key: &Key) -> Option<V> {
        self.value(key)?.parse().ok()
    }
}

/// Builds [`Settings`] on first access and hands out the same instance after.
///
/// Concurrent first callers block until the single load finishes. A failed
/// load is returned to its caller and retried on the next access.
#[derive(Debug)]
pub struct SettingsProvider {
    options: SettingsOptions,
    instance: OnceCell<Arc<Settings>>,
}

impl SettingsProvider {
    pub fn new(options: SettingsOptions) -> Self {
        Self {
            options,
            instance: OnceCell::new(),
        }
    }

    pub fn get(&self) -> Result<Arc<Settings>, Error> {
        self.instance().cloned()
    }

    pub fn root(&self) -> Result<&ConfigTree, Error> {
        Ok(self.instance()?.root())
    }

    pub fn value(&self, key: &Key) -> Result<Option<String>, Error> {
        Ok(self.root()?.value(key.as_str()))
    }

    pub fn typed_value<V: FromStr>(&self, key: &Key) -> Result<Option<V>, Error> {
        Ok(self.value(key)?.and_then(|value| value.parse().ok()))
    }

    fn instance(&self) -> Result<&Arc<Settings>, Error> {
        self.instance
            .get_or_try_init(|| Settings::load(&self.options).map(Arc::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    fn options(dir: &TempDir, prefix: &str) -> SettingsOptions {
        SettingsOptions::default()
            .with_base_dir(dir.path())
            .with_environment("Development")
            .with_env_prefix(prefix)
    }

    #[test]
    fn test_override_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "appsettings.toml", "a = 1\nb = 2");
        write(dir.path(), "appsettings.Development.toml", "b = 3");
        std::env::set_var("ESSENTIALS_SETTINGS_ORDER__b", "4");

        let settings = Settings::load(&options(&dir, "ESSENTIALS_SETTINGS_ORDER")).unwrap();

        assert_eq!(settings.value(&Key::new("b")).as_deref(), Some("4"));
        assert_eq!(settings.value(&Key::new("a")).as_deref(), Some("1"));
        assert_eq!(settings.environment(), "Development");
    }

    #[test]
    fn test_environment_file_overrides_base() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "appsettings.toml", "a = 1\nb = 2");
        write(dir.path(), "appsettings.Development.toml", "b = 3");

        let settings = Settings::load(&options(&dir, "ESSENTIALS_SETTINGS_NO_VARS")).unwrap();

        assert_eq!(settings.typed_value::<i64>(&Key::new("b")), Some(3));
    }

    #[test]
    fn test_missing_base_file_fails() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "appsettings.Development.toml", "b = 3");

        let result = Settings::load(&options(&dir, "ESSENTIALS_SETTINGS_MISSING"));

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingSource(_)))
        ));
    }

    #[test]
    fn test_environment_file_requirement() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "appsettings.toml", "a = 1");

        let optional = options(&dir, "ESSENTIALS_SETTINGS_ENVFILE");
        assert!(Settings::load(&optional).is_ok());

        let required = optional.with_environment_file(EnvironmentFile::Required);
        assert!(matches!(
            Settings::load(&required),
            Err(Error::Config(ConfigError::MissingSource(path))) if path.ends_with("appsettings.Development.toml")
        ));
    }

    #[test]
    fn test_typed_values() {
        let tree = ConfigTree::new(
            toml::from_str("port = 8080\nname = \"demo\"\ndebug = true\nratio = \"0.25\"").unwrap(),
        );
        let settings = Settings::from_tree("Production", tree);

        assert_eq!(settings.typed_value::<u16>(&Key::new("port")), Some(8080));
        assert_eq!(settings.typed_value::<bool>(&Key::new("debug")), Some(true));
        assert_eq!(settings.typed_value::<f64>(&Key::new("ratio")), Some(0.25));
        assert_eq!(settings.typed_value::<u16>(&Key::new("name")), None);
        assert_eq!(settings.typed_value::<u16>(&Key::new("missing")), None);
        assert_eq!(settings.typed_value::<String>(&Key::new("name")).as_deref(), Some("demo"));
    }

    #[test]
    fn test_provider_loads_once_under_contention() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "appsettings.toml", "PingKey = \"pong\"");
        let provider = SettingsProvider::new(options(&dir, "ESSENTIALS_SETTINGS_PROVIDER"));

        let instances: Vec<Arc<Settings>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| provider.get().unwrap())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(instances.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(
            provider.value(&Key::new("PingKey")).unwrap().as_deref(),
            Some("pong")
        );
    }

    #[test]
    fn test_provider_propagates_construction_failure() {
        let dir = TempDir::new().unwrap();
        let provider = SettingsProvider::new(options(&dir, "ESSENTIALS_SETTINGS_FAILING"));

        assert!(matches!(
            provider.root(),
            Err(Error::Config(ConfigError::MissingSource(_)))
        ));
        assert!(provider.value(&Key::new("a")).is_err());

        write(dir.path(), "appsettings.toml", "a = 7");
        assert_eq!(provider.typed_value::<u8>(&Key::new("a")).unwrap(), Some(7));
    }
}
