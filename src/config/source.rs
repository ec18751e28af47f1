use toml::{Table, Value};

use super::ConfigError;

/// A value contributed by a source, addressed by its path from the root.
#[derive(Debug, Clone)]
pub struct ConfigEntry {
    pub path: Vec<String>,
    pub value: Value,
}

impl ConfigEntry {
    /// A whole document, merged into the root table.
    pub fn root(table: Table) -> Self {
        Self {
            path: Vec::new(),
            value: Value::Table(table),
        }
    }

    /// An entry that lands at `path`; an empty path addresses the root.
    pub fn at_path(path: Vec<String>, value: Value) -> Self {
        Self { path, value }
    }
}

/// One layer of the configuration pipeline.
pub trait ConfigSource: Send + Sync + std::fmt::Debug {
    fn entries(&self) -> Result<Vec<ConfigEntry>, ConfigError>;
}

/// Writes `value` at `path`, overriding leaves already present there.
///
/// Tables on both sides are merged key by key; anything else replaces.
pub fn merge_at_path(table: &mut Table, path: &[String], value: Value) {
    let Some((first, rest)) = path.split_first() else {
        if let Value::Table(overlay) = value {
            deep_merge(table, overlay);
        }
        return;
    };

    if rest.is_empty() {
        match (table.get_mut(first), value) {
            (Some(Value::Table(base)), Value::Table(overlay)) => deep_merge(base, overlay),
            (_, value) => {
                table.insert(first.clone(), value);
            }
        }
        return;
    }

    if !matches!(table.get(first), Some(Value::Table(_))) {
        table.insert(first.clone(), Value::Table(Table::new()));
    }

    if let Some(Value::Table(nested)) = table.get_mut(first) {
        merge_at_path(nested, rest, value);
    }
}

/// Merges `overlay` into `base` recursively.
///
/// Only tables on both sides are descended into. Any other overlay value,
/// arrays included, replaces whatever `base` held under that key.
fn deep_merge(base: &mut Table, overlay: Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(Value::Table(base_table)), Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(s: &str) -> Table {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_root_entry_overrides_leaves_only() {
        let mut base = table(
            r#"
            a = 1
            [server]
            host = "localhost"
            port = 80
            "#,
        );
        merge_at_path(&mut base, &[], Value::Table(table("[server]\nport = 8080")));

        assert_eq!(base["a"].as_integer(), Some(1));
        assert_eq!(base["server"]["host"].as_str(), Some("localhost"));
        assert_eq!(base["server"]["port"].as_integer(), Some(8080));
    }

    #[test]
    fn test_nested_path_creates_tables() {
        let mut base = Table::new();
        let path = vec!["Logging".to_string(), "minimum_level".to_string()];
        merge_at_path(&mut base, &path, Value::String("debug".into()));

        assert_eq!(base["Logging"]["minimum_level"].as_str(), Some("debug"));
    }

    #[test]
    fn test_path_through_scalar_replaces_it() {
        let mut base = table("a = 1");
        let path = vec!["a".to_string(), "b".to_string()];
        merge_at_path(&mut base, &path, Value::Integer(2));

        assert_eq!(base["a"]["b"].as_integer(), Some(2));
    }
}
