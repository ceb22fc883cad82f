//! Host configuration types

use chimera_core::{ConfigError, Configuration};
use serde::{Deserialize, Serialize};

/// Host configuration read from the `Core` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CoreConfig {
    /// Base directory of module binaries, relative to the executable directory
    #[serde(alias = "moduleRoot")]
    pub module_root: String,

    /// Module manifest, in discovery order
    #[serde(alias = "availableModules")]
    pub available_modules: Vec<ModuleDescriptor>,
}

impl CoreConfig {
    /// Configuration section holding the host settings
    pub const SECTION: &'static str = "Core";

    /// Bind the `Core` section, falling back to an empty manifest
    pub fn from_configuration(configuration: &Configuration) -> Result<Self, ConfigError> {
        configuration.section(Self::SECTION).bind_or_default()
    }
}

/// Where to find one module binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    /// Library file stem
    #[serde(rename = "ModuleName", alias = "name", alias = "moduleName")]
    pub name: String,

    /// Directory below the module root
    #[serde(rename = "ModulePath", alias = "relativePath", alias = "modulePath", default)]
    pub relative_path: String,
}

impl ModuleDescriptor {
    /// Create a new module descriptor
    pub fn new(name: impl Into<String>, relative_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
        }
    }
}
