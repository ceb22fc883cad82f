//! Configuration validation

use crate::CoreConfig;
use chimera_core::ConfigError;
use std::collections::HashSet;
use std::path::Component;
use std::path::Path;

/// Validate the module manifest
pub fn validate_core_config(config: &CoreConfig) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for descriptor in &config.available_modules {
        let name = descriptor.name.trim();

        if name.is_empty() {
            return Err(ConfigError::invalid("module name cannot be empty"));
        }

        if name.contains(['/', '\\']) {
            return Err(ConfigError::invalid(format!(
                "module name '{name}' must be a file name, not a path"
            )));
        }

        if Path::new(&descriptor.relative_path).is_absolute() {
            tracing::warn!(
                module = %name,
                path = %descriptor.relative_path,
                "Module path is absolute and will ignore the module root"
            );
        }

        if Path::new(&descriptor.relative_path)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            tracing::warn!(
                module = %name,
                path = %descriptor.relative_path,
                "Module path escapes the module root"
            );
        }

        if !seen.insert(name.to_lowercase()) {
            tracing::warn!(
                module = %name,
                "Duplicate module name; only the first match is selectable"
            );
        }
    }

    Ok(())
}
