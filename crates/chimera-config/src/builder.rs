//! Configuration builder

use crate::loader::load_from_file;
use crate::merger::merge_values;
use chimera_core::{ConfigError, Configuration};
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug)]
enum Source {
    File { path: PathBuf, optional: bool },
    Value(Value),
}

/// Builder for layering configuration sources
///
/// Sources are merged in the order they are added; later sources override
/// earlier ones.
#[derive(Debug, Default)]
pub struct ConfigurationBuilder {
    sources: Vec<Source>,
}

impl ConfigurationBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required file
    pub fn add_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(Source::File {
            path: path.into(),
            optional: false,
        });
        self
    }

    /// Add a file that is skipped when it does not exist
    pub fn add_optional_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(Source::File {
            path: path.into(),
            optional: true,
        });
        self
    }

    /// Add an in-memory layer
    pub fn add_value(mut self, value: Value) -> Self {
        self.sources.push(Source::Value(value));
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Configuration, ConfigError> {
        let mut merged = Value::Object(serde_json::Map::new());

        for source in self.sources {
            let layer = match source {
                Source::File { path, optional } => match load_from_file(&path) {
                    Ok(value) => value,
                    Err(ConfigError::NotFound(_)) if optional => {
                        tracing::debug!(path = %path.display(), "Optional configuration file not found");
                        continue;
                    }
                    Err(e) => return Err(e),
                },
                Source::Value(value) => value,
            };
            merge_values(&mut merged, layer);
        }

        Ok(Configuration::from_value(merged))
    }
}
