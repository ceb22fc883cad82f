//! The module contract and the entry point every module binary exports

use crate::configuration::Configuration;
use crate::context::ModuleContext;
use crate::error::{ModuleError, Result};
use crate::exit_code::ExitCode;
use crate::logging::LoggerFactory;
use crate::services::ServiceCollection;
use async_trait::async_trait;
use futures::FutureExt;
use std::any::TypeId;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

/// Contract every module implements
#[async_trait]
pub trait Module: Send + Sync + fmt::Debug {
    /// Module name, used for selection and logging
    ///
    /// Names should be unique across modules; the host selects the first match.
    fn name(&self) -> &str;

    /// Human-readable summary shown when listing modules
    fn description(&self) -> &str {
        ""
    }

    /// Register the module's own services
    ///
    /// `services` already contains every host registration. Registering a
    /// capability the host provides shadows the host's registration for this
    /// module only. Called once per invocation, before [`Module::execute`].
    fn configure_services(
        &self,
        _services: &mut ServiceCollection,
        _configuration: &Configuration,
    ) -> Result<()> {
        Ok(())
    }

    /// Run the module
    ///
    /// `args` are the command-line arguments after the module name.
    async fn execute(&self, context: &ModuleContext, args: Vec<String>) -> Result<ExitCode>;

    /// Name of the concrete module type
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Signature of the entry point exported by module binaries
pub type ModuleEntryFn = fn() -> Vec<ModuleConstructor>;

/// Symbol name of the entry point exported by module binaries
pub const MODULE_ENTRY_SYMBOL: &[u8] = b"chimera_module_exports\0";

/// Signature of the build fingerprint exported by module binaries
pub type ModuleFingerprintFn = fn() -> TypeId;

/// Symbol name of the build fingerprint exported by module binaries
pub const MODULE_FINGERPRINT_SYMBOL: &[u8] = b"chimera_module_fingerprint\0";

/// Identity of this build of `chimera-core`
///
/// Services are keyed by `TypeId`, and a `TypeId` differs between builds of
/// the same crate with different features or toolchains. A module binary
/// whose fingerprint differs from the host's cannot resolve any host service.
pub fn build_fingerprint() -> TypeId {
    TypeId::of::<dyn LoggerFactory>()
}

/// No-argument constructor for one module type
#[derive(Clone, Copy)]
pub struct ModuleConstructor {
    type_name: &'static str,
    construct: fn() -> Result<Box<dyn Module>>,
}

impl fmt::Debug for ModuleConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleConstructor")
            .field("type_name", &self.type_name)
            .finish()
    }
}

impl ModuleConstructor {
    /// Create a constructor from a fallible function
    pub fn new(type_name: &'static str, construct: fn() -> Result<Box<dyn Module>>) -> Self {
        Self {
            type_name,
            construct,
        }
    }

    /// Constructor for a module type built with `Default`
    ///
    /// Panics raised while constructing, configuring or executing the module
    /// are caught inside the binary the module is compiled into and returned
    /// as [`ModuleError::Panicked`]. A panic must never unwind into another
    /// binary, which has its own panic runtime.
    pub fn of<M: Module + Default + 'static>() -> Self {
        Self::new(std::any::type_name::<M>(), construct_contained::<M>)
    }

    /// Name of the constructed type
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Construct a module instance
    pub fn construct(&self) -> Result<Box<dyn Module>> {
        (self.construct)()
    }
}

fn construct_contained<M: Module + Default + 'static>() -> Result<Box<dyn Module>> {
    let module = panic::catch_unwind(M::default).map_err(|payload| ModuleError::panicked(payload.as_ref()))?;
    Ok(Box::new(Contained(module)))
}

/// Runs a module's code under the panic runtime of its own binary
#[derive(Debug)]
struct Contained<M>(M);

#[async_trait]
impl<M: Module> Module for Contained<M> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn description(&self) -> &str {
        self.0.description()
    }

    fn configure_services(&self, services: &mut ServiceCollection, configuration: &Configuration) -> Result<()> {
        panic::catch_unwind(AssertUnwindSafe(|| self.0.configure_services(services, configuration)))
            .unwrap_or_else(|payload| Err(ModuleError::panicked(payload.as_ref())))
    }

    async fn execute(&self, context: &ModuleContext, args: Vec<String>) -> Result<ExitCode> {
        let execution = panic::catch_unwind(AssertUnwindSafe(|| self.0.execute(context, args)))
            .map_err(|payload| ModuleError::panicked(payload.as_ref()))?;

        AssertUnwindSafe(execution)
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(ModuleError::panicked(payload.as_ref())))
    }

    fn type_name(&self) -> &'static str {
        self.0.type_name()
    }
}

/// Export module types from a module binary
///
/// Generates the `chimera_module_exports` entry point the host looks up after
/// loading the binary, and the `chimera_module_fingerprint` the host compares
/// against its own [`build_fingerprint`]. Modules are constructed in the
/// listed order.
///
/// ```rust,ignore
/// chimera_core::export_modules!(ExamplePrependModule);
/// ```
#[macro_export]
macro_rules! export_modules {
    ($($module:ty),+ $(,)?) => {
        /// Module constructors exported by this binary
        #[no_mangle]
        pub fn chimera_module_exports() -> ::std::vec::Vec<$crate::ModuleConstructor> {
            ::std::vec![$($crate::ModuleConstructor::of::<$module>()),+]
        }

        /// Build fingerprint of the `chimera-core` this binary was compiled against
        #[no_mangle]
        pub fn chimera_module_fingerprint() -> ::std::any::TypeId {
            $crate::module::build_fingerprint()
        }
    };
}
