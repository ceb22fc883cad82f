//! # ChimeraKit Configuration
//!
//! Configuration management with support for:
//! - JSON files
//! - Layered files (`appsettings.json` then `appsettings.<environment>.json`)
//! - Environment variable expansion (`${VAR}` and `${VAR:-default}`)
//! - Validation of the module manifest

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod builder;
pub mod loader;
pub mod merger;
pub mod types;
pub mod validator;

pub use builder::ConfigurationBuilder;
pub use loader::{load_from_file, load_from_str, load_host_configuration, resolve_environment};
pub use merger::merge_values;
pub use types::{CoreConfig, ModuleDescriptor};
pub use validator::validate_core_config;

/// Environment variable selecting the configuration environment
pub const ENVIRONMENT_VAR: &str = "CHIMERAKIT_ENV";

/// Environment used when none is selected
pub const DEFAULT_ENVIRONMENT: &str = "Development";

/// Base configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "appsettings.json";
