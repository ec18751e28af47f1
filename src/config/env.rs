use toml::Value;

use super::source::{ConfigEntry, ConfigSource};
use super::ConfigError;

/// Process environment variables as configuration overrides.
///
/// A variable name is split on `separator` into a path, so with the default
/// `__` separator `Logging__minimum_level=debug` overrides
/// `Logging.minimum_level`. Segments keep their case. Values are always
/// strings; typed reads parse them on lookup.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: Option<String>,
    separator: String,
}

impl EnvSource {
    /// Without a prefix every variable in the environment becomes an entry.
    ///
    /// # Panics
    ///
    /// Panics if `separator` is empty.
    pub fn new(prefix: Option<String>, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        assert!(!separator.is_empty(), "separator must not be empty");
        Self { prefix, separator }
    }

    fn path_of<'a>(&self, name: &'a str) -> Option<&'a str> {
        match &self.prefix {
            Some(prefix) => name
                .strip_prefix(prefix.as_str())?
                .strip_prefix(self.separator.as_str()),
            None => Some(name),
        }
    }

    fn entries_from<I>(&self, vars: I) -> Vec<ConfigEntry>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(name, value)| {
                let path_str = self.path_of(&name)?;
                if path_str.is_empty() {
                    return None;
                }
                let path = path_str
                    .split(self.separator.as_str())
                    .map(str::to_string)
                    .collect();
                Some(ConfigEntry::at_path(path, Value::String(value)))
            })
            .collect()
    }
}

impl ConfigSource for EnvSource {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError> {
        // Non-Unicode variables cannot address a configuration path.
        let vars = std::env::vars_os()
            .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)));
        Ok(self.entries_from(vars))
    }
}
