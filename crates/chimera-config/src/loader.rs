//! Configuration loading

use crate::builder::ConfigurationBuilder;
use crate::{DEFAULT_CONFIG_FILE, DEFAULT_ENVIRONMENT, ENVIRONMENT_VAR};
use chimera_core::{ConfigError, Configuration};
use regex::Regex;
use serde_json::Value;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Load a configuration tree from a JSON file
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Value, ConfigError> {
    let path = path.as_ref();

    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ConfigError::NotFound(path.display().to_string()),
        _ => ConfigError::Io(e),
    })?;

    load_from_str(&content)
}

/// Expand environment variables in one configuration string
/// Supports syntax: ${VAR} and ${VAR:-default}
fn expand_env_vars(re: &Regex, content: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(content.len());
    let mut last_match = 0;

    for cap in re.captures_iter(content) {
        let (Some(full_match), Some(var_name)) = (cap.get(0), cap.get(1)) else {
            continue;
        };
        let var_name = var_name.as_str();
        let default_value = cap.get(3).map(|m| m.as_str());

        let value = match env::var(var_name) {
            Ok(val) => val,
            Err(_) => match default_value {
                Some(default) => default.to_string(),
                None => {
                    return Err(ConfigError::Environment(format!(
                        "Environment variable '{var_name}' not set and no default provided"
                    )));
                }
            },
        };

        result.push_str(&content[last_match..full_match.start()]);
        result.push_str(&value);
        last_match = full_match.end();
    }

    result.push_str(&content[last_match..]);

    Ok(result)
}

/// Expand environment variables in every string value of `value`
///
/// Object keys are left untouched. Expanded text is never reparsed.
fn expand_strings(re: &Regex, value: &mut Value) -> Result<(), ConfigError> {
    match value {
        Value::String(s) if s.contains("${") => *s = expand_env_vars(re, s)?,
        Value::Array(items) => {
            for item in items {
                expand_strings(re, item)?;
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                expand_strings(re, item)?;
            }
        }
        _ => {}
    }
    Ok(())
}

/// Load a configuration tree from JSON text
pub fn load_from_str(content: &str) -> Result<Value, ConfigError> {
    let mut value: Value = serde_json::from_str(content)
        .map_err(|e| ConfigError::parse(format!("Failed to parse JSON: {e}")))?;

    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(:-([^}]*))?\}")
        .map_err(|e| ConfigError::Environment(format!("Invalid regex: {e}")))?;
    expand_strings(&re, &mut value)?;

    Ok(value)
}

/// Select the configuration environment
///
/// An explicit name wins, then `CHIMERAKIT_ENV`, then `Development`.
pub fn resolve_environment(explicit: Option<&str>) -> String {
    explicit
        .map(str::to_string)
        .or_else(|| env::var(ENVIRONMENT_VAR).ok())
        .filter(|e| !e.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string())
}

/// Path of the environment-specific overlay for `base`
///
/// `appsettings.json` with environment `Production` becomes
/// `appsettings.Production.json`.
pub fn environment_overlay_path(base: &Path, environment: &str) -> PathBuf {
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let file_name = match base.extension().and_then(|s| s.to_str()) {
        Some(ext) => format!("{stem}.{environment}.{ext}"),
        None => format!("{stem}.{environment}"),
    };
    base.with_file_name(file_name)
}

/// Load the host configuration from `dir`
///
/// Reads `appsettings.json` (required) and then `appsettings.<environment>.json`
/// (optional) on top of it.
pub fn load_host_configuration<P: AsRef<Path>>(
    dir: P,
    environment: &str,
) -> Result<Configuration, ConfigError> {
    let base = dir.as_ref().join(DEFAULT_CONFIG_FILE);
    let overlay = environment_overlay_path(&base, environment);

    tracing::debug!(
        base = %base.display(),
        overlay = %overlay.display(),
        environment,
        "Loading host configuration"
    );

    ConfigurationBuilder::new()
        .add_file(base)
        .add_optional_file(overlay)
        .build()
}
