//! # ChimeraKit Host
//!
//! Discovers module binaries, composes a service provider for the selected
//! module and runs it.
//!
//! ```rust,no_run
//! use chimera_host::Host;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let configuration = chimera_config::load_host_configuration(".", "Development")?;
//! let host = Host::builder(configuration).build()?;
//! let code = host.run(std::env::args().skip(1).collect(), &mut std::io::stdout()).await?;
//! # let _ = code;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod error;
pub mod factory;
pub mod host;
pub mod loader;
pub mod logging;

pub use error::{HostError, LoadError, Result};
pub use factory::ModuleServiceFactory;
pub use host::{select_module, Host, HostBuilder, LIST_COMMAND};
pub use loader::{
    executable_directory, DynamicLibrarySource, LoadedModule, ModuleLibrary, ModuleLoader,
    ModuleSource, StaticModuleSource,
};
pub use logging::{TracingLoggerFactory, TracingSink};
