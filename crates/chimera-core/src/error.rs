//! Error types shared by the host and modules

use std::any::Any;
use std::fmt;

/// Errors raised while resolving services from a [`ServiceProvider`](crate::ServiceProvider)
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// No registration exists for the requested capability
    #[error("No service registered for type {0}")]
    NotRegistered(String),

    /// A registration's factory failed
    #[error("Failed to construct service {service}: {message}")]
    Construction {
        /// Requested capability
        service: String,
        /// Failure reason
        message: String,
    },

    /// The stored instance does not have the requested type
    #[error("Registered service does not match requested type {0}")]
    TypeMismatch(String),
}

/// Result type for service resolution
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    /// Create a new not registered error
    pub fn not_registered(service: impl fmt::Display) -> Self {
        Self::NotRegistered(service.to_string())
    }

    /// Create a new construction error
    pub fn construction(service: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Construction {
            service: service.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a new type mismatch error
    pub fn type_mismatch(service: impl fmt::Display) -> Self {
        Self::TypeMismatch(service.to_string())
    }
}

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration source does not exist
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Configuration source could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// A section could not be bound to the requested type
    #[error("Invalid configuration section '{section}': {message}")]
    Section {
        /// Section path
        section: String,
        /// Failure reason
        message: String,
    },

    /// Configuration values are semantically invalid
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// Environment variable expansion failed
    #[error("Environment error: {0}")]
    Environment(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create a new parse error
    pub fn parse(msg: impl fmt::Display) -> Self {
        Self::Parse(msg.to_string())
    }

    /// Create a new section binding error
    pub fn section(section: impl fmt::Display, message: impl fmt::Display) -> Self {
        Self::Section {
            section: section.to_string(),
            message: message.to_string(),
        }
    }

    /// Create a new validation error
    pub fn invalid(msg: impl fmt::Display) -> Self {
        Self::Invalid(msg.to_string())
    }
}

/// Module error type
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    /// Module configuration could not be bound or is invalid
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A required service could not be resolved
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// Residual command-line arguments were rejected
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// Execution failed
    #[error("Execution failed: {0}")]
    Execution(String),

    /// The invocation observed cancellation
    #[error("Operation cancelled")]
    Cancelled,

    /// Module code panicked
    #[error("Module panicked: {0}")]
    Panicked(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for module operations
pub type Result<T, E = ModuleError> = std::result::Result<T, E>;

impl ModuleError {
    /// Create a new invalid arguments error
    pub fn invalid_arguments(msg: impl fmt::Display) -> Self {
        Self::InvalidArguments(msg.to_string())
    }

    /// Create a new execution error
    pub fn execution(msg: impl fmt::Display) -> Self {
        Self::Execution(msg.to_string())
    }

    /// Create a panic error from a caught panic payload
    pub fn panicked(payload: &(dyn Any + Send)) -> Self {
        Self::Panicked(panic_message(payload))
    }
}

/// Message carried by a caught panic payload
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
