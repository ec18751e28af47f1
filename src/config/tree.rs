use serde::de::DeserializeOwned;
use toml::{Table, Value};

use super::ConfigError;

/// Separator between segments of a configuration path.
pub const PATH_SEPARATOR: char = '.';

/// The merged, path-addressable configuration document.
///
/// Paths are dot-separated (`Logging.minimum_level`) and passed through
/// as-is: no trimming or case folding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigTree {
    table: Table,
}

impl ConfigTree {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    pub fn as_table(&self) -> &Table {
        &self.table
    }

    /// Looks up the raw value at `path`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split(PATH_SEPARATOR);
        let mut current = self.table.get(parts.next()?)?;
        for part in parts {
            current = current.as_table()?.get(part)?;
        }
        Some(current)
    }

    /// Returns the string form of the scalar at `path`.
    ///
    /// Tables and arrays have no string form and read as `None`.
    pub fn value(&self, path: &str) -> Option<String> {
        match self.get(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Boolean(b) => Some(b.to_string()),
            Value::Datetime(dt) => Some(dt.to_string()),
            Value::Array(_) | Value::Table(_) => None,
        }
    }

    /// A section exists when it holds a scalar or a non-empty table or array.
    pub fn section_exists(&self, path: &str) -> bool {
        match self.get(path) {
            Some(Value::Table(t)) => !t.is_empty(),
            Some(Value::Array(a)) => !a.is_empty(),
            Some(_) => true,
            None => false,
        }
    }

    /// Deserializes the section at `path`, or `None` when it doesn't exist.
    pub fn section<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ConfigError> {
        let Some(value) = self.get(path).filter(|_| self.section_exists(path)) else {
            return Ok(None);
        };
        value
            .clone()
            .try_into()
            .map(Some)
            .map_err(|source| ConfigError::InvalidSection {
                section: path.to_string(),
                source,
            })
    }
}

impl From<Table> for ConfigTree {
    fn from(table: Table) -> Self {
        Self::new(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn tree(s: &str) -> ConfigTree {
        ConfigTree::new(toml::from_str(s).unwrap())
    }

    #[test]
    fn test_scalar_values_read_as_strings() {
        let tree = tree(
            r#"
            name = "demo"
            port = 8080
            ratio = 0.5
            debug = true
            [server]
            host = "localhost"
            "#,
        );

        assert_eq!(tree.value("name").as_deref(), Some("demo"));
        assert_eq!(tree.value("port").as_deref(), Some("8080"));
        assert_eq!(tree.value("ratio").as_deref(), Some("0.5"));
        assert_eq!(tree.value("debug").as_deref(), Some("true"));
        assert_eq!(tree.value("server.host").as_deref(), Some("localhost"));
    }

    #[test]
    fn test_tables_and_missing_paths_have_no_value() {
        let tree = tree("[server]\nhost = \"localhost\"\nports = [1, 2]");

        assert_eq!(tree.value("server"), None);
        assert_eq!(tree.value("server.ports"), None);
        assert_eq!(tree.value("server.missing"), None);
        assert_eq!(tree.value("server.host.deeper"), None);
        assert_eq!(tree.value(""), None);
        assert_eq!(tree.value("server..host"), None);
    }

    #[test]
    fn test_section_exists() {
        let tree = tree("flag = false\n[empty]\n[Logging]\nminimum_level = \"info\"");

        assert!(tree.section_exists("Logging"));
        assert!(tree.section_exists("flag"));
        assert!(!tree.section_exists("empty"));
        assert!(!tree.section_exists("missing"));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Server {
        host: String,
        port: u16,
    }

    #[test]
    fn test_section_deserializes() {
        let tree = tree("[server]\nhost = \"localhost\"\nport = 80");

        let server: Option<Server> = tree.section("server").unwrap();
        assert_eq!(
            server,
            Some(Server {
                host: "localhost".into(),
                port: 80
            })
        );
        assert_eq!(tree.section::<Server>("client").unwrap(), None);
    }

    #[test]
    fn test_section_with_wrong_shape_fails() {
        let tree = tree("[server]\nhost = \"localhost\"\nport = \"eighty\"");

        let result = tree.section::<Server>("server");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSection { ref section, .. }) if section == "server"
        ));
    }
}
