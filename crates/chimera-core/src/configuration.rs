//! Read-only configuration tree handed to modules

use crate::error::ConfigError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// Hierarchical configuration
///
/// Section paths are colon separated (`"Core:ModuleRoot"`) and keys match
/// case-insensitively. A missing section is an empty section, never an error.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    path: String,
    root: Arc<Value>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::from_value(Value::Object(serde_json::Map::new()))
    }
}

impl Configuration {
    /// Wrap an already merged configuration tree
    pub fn from_value(value: Value) -> Self {
        Self {
            path: String::new(),
            root: Arc::new(value),
        }
    }

    /// Path of this section relative to the root (empty for the root)
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw value of this section
    pub fn value(&self) -> &Value {
        &self.root
    }

    /// Check if this section holds a value
    pub fn exists(&self) -> bool {
        !self.root.is_null()
    }

    /// Get a child section
    pub fn section(&self, path: &str) -> Configuration {
        let mut current = self.value();
        for key in path.split(':').filter(|k| !k.is_empty()) {
            current = child(current, key).unwrap_or(&Value::Null);
        }

        let full_path = if self.path.is_empty() {
            path.to_string()
        } else {
            format!("{}:{}", self.path, path)
        };

        Configuration {
            path: full_path,
            root: Arc::new(current.clone()),
        }
    }

    /// Deserialize the value at `key`, `None` when absent
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let section = self.section(key);
        if !section.exists() {
            return Ok(None);
        }
        section.bind().map(Some)
    }

    /// Deserialize this section
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        T::deserialize(self.value()).map_err(|e| ConfigError::section(&self.path, e))
    }

    /// Deserialize this section, using `T::default()` when it is absent
    pub fn bind_or_default<T: DeserializeOwned + Default>(&self) -> Result<T, ConfigError> {
        if self.exists() {
            self.bind()
        } else {
            Ok(T::default())
        }
    }
}

fn child<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map
            .get(key)
            .or_else(|| {
                map.iter()
                    .find(|(k, _)| k.eq_ignore_ascii_case(key))
                    .map(|(_, v)| v)
            }),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn sample() -> Configuration {
        Configuration::from_value(json!({
            "Core": {
                "ModuleRoot": "modules",
                "AvailableModules": [
                    { "ModuleName": "Echo", "ModulePath": "echo" }
                ]
            },
            "ExamplePrepend": { "SeparationCharacter": "-" }
        }))
    }

    #[test]
    fn test_section_lookup() {
        let config = sample();
        let root = config.section("Core:ModuleRoot");
        assert_eq!(root.path(), "Core:ModuleRoot");
        assert_eq!(root.bind::<String>().unwrap(), "modules");
    }

    #[test]
    fn test_case_insensitive_keys() {
        let config = sample();
        assert_eq!(
            config.get::<String>("core:moduleroot").unwrap().as_deref(),
            Some("modules")
        );
    }

    #[test]
    fn test_array_index() {
        let config = sample();
        let name: Option<String> = config.get("Core:AvailableModules:0:ModuleName").unwrap();
        assert_eq!(name.as_deref(), Some("Echo"));
    }

    #[test]
    fn test_missing_section() {
        let config = sample();
        let missing = config.section("Nope:Deeper");
        assert!(!missing.exists());
        assert_eq!(config.get::<String>("Nope").unwrap(), None);
        assert_eq!(missing.bind_or_default::<Vec<String>>().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_nested_section_path() {
        let core = sample().section("Core");
        let modules = core.section("AvailableModules");
        assert_eq!(modules.path(), "Core:AvailableModules");
    }

    #[test]
    fn test_bind_error_names_section() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            count: u32,
        }

        let err = sample().section("ExamplePrepend").bind::<Strict>().unwrap_err();
        assert!(err.to_string().contains("ExamplePrepend"));
    }
}
