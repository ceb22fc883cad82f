//! Module selection and execution

use crate::error::Result;
use crate::factory::ModuleServiceFactory;
use crate::loader::{LoadedModule, ModuleLoader, ModuleSource};
use crate::logging::TracingLoggerFactory;
use chimera_config::{validate_core_config, CoreConfig};
use chimera_core::logging::short_type_name;
use chimera_core::{
    CapitalizationService, Configuration, DefaultCapitalizationService, ExitCode, LoggerFactory,
    Module, ModuleContext, ModuleError, ServiceCollection,
};
use futures::FutureExt;
use std::fmt;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn, Instrument};

/// Argument that lists the discovered modules
pub const LIST_COMMAND: &str = "list";

type ServiceHook = Box<dyn FnOnce(&mut ServiceCollection) + Send>;

/// Builder for [`Host`]
pub struct HostBuilder {
    configuration: Configuration,
    base_dir: Option<PathBuf>,
    source: Option<Arc<dyn ModuleSource>>,
    logger_factory: Option<Arc<dyn LoggerFactory>>,
    service_hooks: Vec<ServiceHook>,
}

impl fmt::Debug for HostBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBuilder")
            .field("base_dir", &self.base_dir)
            .field("source", &self.source)
            .field("service_hooks", &self.service_hooks.len())
            .finish()
    }
}

impl HostBuilder {
    /// Create a new host builder
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            base_dir: None,
            source: None,
            logger_factory: None,
            service_hooks: Vec::new(),
        }
    }

    /// Resolve the module root from `dir` instead of the executable directory
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Load modules through `source` instead of dynamic libraries
    pub fn module_source(mut self, source: Arc<dyn ModuleSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the logger factory handed to modules
    pub fn logger_factory(mut self, factory: Arc<dyn LoggerFactory>) -> Self {
        self.logger_factory = Some(factory);
        self
    }

    /// Register additional host services
    ///
    /// Runs after the built-in registrations, so it may replace them.
    pub fn configure_services<F>(mut self, configure: F) -> Self
    where
        F: FnOnce(&mut ServiceCollection) + Send + 'static,
    {
        self.service_hooks.push(Box::new(configure));
        self
    }

    /// Build the host
    pub fn build(self) -> Result<Host> {
        let core = CoreConfig::from_configuration(&self.configuration)?;
        validate_core_config(&core)?;

        let loader = match self.base_dir {
            Some(dir) => ModuleLoader::with_base_dir(core.clone(), dir),
            None => ModuleLoader::new(core.clone())?,
        };
        let loader = match self.source {
            Some(source) => loader.with_source(source),
            None => loader,
        };

        let logger_factory = self
            .logger_factory
            .unwrap_or_else(|| Arc::new(TracingLoggerFactory::new()));

        let mut services = host_services(&self.configuration, core, logger_factory);
        for hook in self.service_hooks {
            hook(&mut services);
        }

        Ok(Host {
            loader,
            factory: ModuleServiceFactory::new(services, self.configuration),
        })
    }
}

fn host_services(
    configuration: &Configuration,
    core: CoreConfig,
    logger_factory: Arc<dyn LoggerFactory>,
) -> ServiceCollection {
    let mut services = ServiceCollection::new();
    services
        .add_instance(logger_factory)
        .add_instance(Arc::new(configuration.clone()))
        .add_instance(Arc::new(core))
        .add_singleton::<dyn CapitalizationService, _>(|provider| {
            let loggers = provider.get_service::<dyn LoggerFactory>()?;
            let service =
                DefaultCapitalizationService::new(loggers.logger_for::<DefaultCapitalizationService>());
            Ok(Arc::new(service) as Arc<dyn CapitalizationService>)
        });
    services
}

/// Find a module by case-insensitive exact name, first match wins
pub fn select_module<'a>(modules: &'a [LoadedModule], name: &str) -> Option<&'a LoadedModule> {
    let wanted = name.to_lowercase();
    modules.iter().find(|m| m.name().to_lowercase() == wanted)
}

/// Runs one module per invocation
#[derive(Debug)]
pub struct Host {
    loader: ModuleLoader,
    factory: ModuleServiceFactory,
}

impl Host {
    /// Create a new host builder
    pub fn builder(configuration: Configuration) -> HostBuilder {
        HostBuilder::new(configuration)
    }

    /// Module loader
    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    /// Service composition factory
    pub fn factory(&self) -> &ModuleServiceFactory {
        &self.factory
    }

    /// Discover the configured modules
    pub fn discover(&self) -> Result<Vec<LoadedModule>> {
        self.loader.discover()
    }

    /// Handle one command line
    ///
    /// With no arguments or `list`, writes the discovered modules to `out`.
    /// Otherwise the first argument selects a module and the rest are passed
    /// to it. Selection failures return [`ExitCode::Error`]; only host-level
    /// failures return an error.
    pub async fn run<W: Write>(&self, args: Vec<String>, out: &mut W) -> Result<ExitCode> {
        info!("Starting application execution");

        let modules = self.discover()?;
        if modules.is_empty() {
            error!("No modules found");
            eprintln!("No modules found. Check the Core:AvailableModules configuration.");
            return Ok(ExitCode::Error);
        }

        let mut args = args.into_iter();
        let command = match args.next() {
            None => return list_modules(&modules, out),
            Some(command) if command == LIST_COMMAND => return list_modules(&modules, out),
            Some(command) => command,
        };

        let Some(selected) = select_module(&modules, &command) else {
            warn!(module = %command, "Module not found");
            eprintln!("Module '{command}' not found. Run with 'list' to see available modules.");
            return Ok(ExitCode::Error);
        };

        let code = self.execute(selected.module(), args.collect()).await?;
        info!(exit_code = %code, "Module execution completed with result");
        Ok(code)
    }

    /// Compose services for `module` and run it with `args`
    ///
    /// Module errors and panics are logged and reported as
    /// [`ExitCode::Error`]. Modules built with `ModuleConstructor::of` catch
    /// their own panics; the catch here covers in-process modules constructed
    /// by hand. The module's services are released before this returns.
    pub async fn execute(&self, module: &dyn Module, args: Vec<String>) -> Result<ExitCode> {
        let provider = self.factory.create_module_service_provider(module)?;
        let logger = provider
            .get_service::<dyn LoggerFactory>()?
            .create_logger(short_type_name(module.type_name()));
        let context = ModuleContext::new(provider, logger, CancellationToken::new());

        let span = info_span!("module", name = %module.name(), module_type = %module.type_name());
        let outcome = async {
            info!(args = args.len(), "Executing module");
            AssertUnwindSafe(module.execute(&context, args))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(ModuleError::panicked(payload.as_ref())))
        }
        .instrument(span)
        .await;

        drop(context);

        let code = match outcome {
            Ok(code) => code,
            Err(ModuleError::Panicked(message)) => {
                error!(module = %module.name(), panic = %message, "Module panicked");
                ExitCode::Error
            }
            Err(e) => {
                error!(module = %module.name(), error = %e, "Module execution failed");
                ExitCode::Error
            }
        };

        Ok(code)
    }
}

fn list_modules<W: Write>(modules: &[LoadedModule], out: &mut W) -> Result<ExitCode> {
    writeln!(out, "Available modules:")?;
    for module in modules {
        writeln!(out, "   {} - {}", module.name(), module.description())?;
    }
    Ok(ExitCode::Ok)
}
