//! # ChimeraKit Core
//!
//! This crate provides the SDK shared by the ChimeraKit host and its modules.
//!
//! ## Contents
//!
//! - **Module contract**: the [`Module`] trait every module implements
//! - **Module context**: the per-invocation [`ModuleContext`] handed to a module
//! - **Service container**: [`ServiceCollection`] registrations and the
//!   [`ServiceProvider`] that resolves them
//! - **Configuration**: the read-only [`Configuration`] tree passed to modules
//! - **Logging**: host-provided [`Logger`]s created through a [`LoggerFactory`]
//! - **Shared services**: capabilities the host registers for every module
//!
//! ## Example
//!
//! ```rust,no_run
//! use chimera_core::prelude::*;
//!
//! #[derive(Debug, Default)]
//! struct EchoModule;
//!
//! #[async_trait]
//! impl Module for EchoModule {
//!     fn name(&self) -> &str { "Echo" }
//!     fn description(&self) -> &str { "Prints its arguments" }
//!
//!     async fn execute(&self, context: &ModuleContext, args: Vec<String>) -> Result<ExitCode, ModuleError> {
//!         context.logger().info(format_args!("echo {}", args.join(" ")));
//!         Ok(ExitCode::Ok)
//!     }
//! }
//!
//! chimera_core::export_modules!(EchoModule);
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod configuration;
pub mod context;
pub mod error;
pub mod exit_code;
pub mod logging;
pub mod module;
pub mod services;
pub mod shared;

pub use configuration::Configuration;
pub use context::ModuleContext;
pub use error::{panic_message, ConfigError, ModuleError, Result, ServiceError, ServiceResult};
pub use exit_code::ExitCode;
pub use logging::{LogLevel, LogSink, Logger, LoggerFactory};
pub use module::{
    build_fingerprint, Module, ModuleConstructor, ModuleEntryFn, ModuleFingerprintFn,
    MODULE_ENTRY_SYMBOL, MODULE_FINGERPRINT_SYMBOL,
};
pub use services::{ServiceCollection, ServiceDescriptor, ServiceLifetime, ServiceProvider};
pub use shared::{CapitalizationService, DefaultCapitalizationService};

/// Prelude module with commonly used types
pub mod prelude {
    pub use crate::configuration::Configuration;
    pub use crate::context::ModuleContext;
    pub use crate::error::{ModuleError, ServiceError};
    pub use crate::exit_code::ExitCode;
    pub use crate::logging::{Logger, LoggerFactory};
    pub use crate::module::Module;
    pub use crate::services::{ServiceCollection, ServiceProvider};
    pub use crate::shared::CapitalizationService;
    pub use async_trait::async_trait;
}
