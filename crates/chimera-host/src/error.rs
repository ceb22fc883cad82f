//! Host error types

use chimera_core::{ConfigError, ModuleError, ServiceError};
use std::fmt;
use std::path::{Path, PathBuf};

/// Failure to load one module binary
///
/// Load failures are never fatal: the loader logs them and skips the module.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// Binary does not exist
    #[error("Module binary not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Binary could not be loaded
    #[error("Failed to load module binary {}: {message}", .path.display())]
    Library {
        /// Binary path
        path: PathBuf,
        /// Loader message
        message: String,
    },

    /// Binary does not export the module entry point
    #[error("Module binary {} has no entry point: {message}", .path.display())]
    MissingEntryPoint {
        /// Binary path
        path: PathBuf,
        /// Loader message
        message: String,
    },

    /// Binary was built against an incompatible chimera-core
    #[error("Module binary {} is incompatible with this host: {message}", .path.display())]
    Incompatible {
        /// Binary path
        path: PathBuf,
        /// Mismatch reason
        message: String,
    },

    /// No in-process module is registered under this name
    #[error("Unknown module: {0}")]
    UnknownModule(String),
}

impl LoadError {
    /// Create a new library load error
    pub fn library(path: &Path, msg: impl fmt::Display) -> Self {
        Self::Library {
            path: path.to_path_buf(),
            message: msg.to_string(),
        }
    }

    /// Create a new missing entry point error
    pub fn missing_entry_point(path: &Path, msg: impl fmt::Display) -> Self {
        Self::MissingEntryPoint {
            path: path.to_path_buf(),
            message: msg.to_string(),
        }
    }

    /// Create a new incompatible binary error
    pub fn incompatible(path: &Path, msg: impl fmt::Display) -> Self {
        Self::Incompatible {
            path: path.to_path_buf(),
            message: msg.to_string(),
        }
    }

    /// Create a new unknown module error
    pub fn unknown_module(name: impl fmt::Display) -> Self {
        Self::UnknownModule(name.to_string())
    }
}

/// Host error type
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// The running executable's directory could not be determined
    #[error("Cannot determine executable directory: {0}")]
    ExecutableDirectory(String),

    /// The module root is missing or not a directory
    #[error("Module root {} is not readable: {message}", .path.display())]
    ModuleRootUnreadable {
        /// Resolved module root
        path: PathBuf,
        /// Failure reason
        message: String,
    },

    /// A module failed to register its services
    #[error("Failed to compose services for module '{module}': {source}")]
    Composition {
        /// Module name
        module: String,
        /// Underlying module error
        #[source]
        source: ModuleError,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Service resolution error
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostError {
    /// Create a new module root error
    pub fn module_root(path: &Path, msg: impl fmt::Display) -> Self {
        Self::ModuleRootUnreadable {
            path: path.to_path_buf(),
            message: msg.to_string(),
        }
    }

    /// Create a new composition error
    pub fn composition(module: impl fmt::Display, source: ModuleError) -> Self {
        Self::Composition {
            module: module.to_string(),
            source,
        }
    }
}

/// Result type for host operations
pub type Result<T, E = HostError> = std::result::Result<T, E>;
