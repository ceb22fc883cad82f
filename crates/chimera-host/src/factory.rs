//! Per-module service composition

use crate::error::{HostError, Result};
use chimera_core::{Configuration, Module, ServiceCollection, ServiceProvider};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Builds one service provider per module invocation
///
/// Holds an immutable snapshot of the host's base registrations. Every
/// provider starts from a copy of that snapshot, so module registrations
/// never reach the host collection or another module's provider.
#[derive(Clone)]
pub struct ModuleServiceFactory {
    base: Arc<ServiceCollection>,
    configuration: Configuration,
}

impl fmt::Debug for ModuleServiceFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleServiceFactory")
            .field("base_services", &self.base.len())
            .finish()
    }
}

impl ModuleServiceFactory {
    /// Create a new factory over the host's registrations
    pub fn new(base: ServiceCollection, configuration: Configuration) -> Self {
        Self {
            base: Arc::new(base),
            configuration,
        }
    }

    /// Host registrations shared by every module
    pub fn base_services(&self) -> &ServiceCollection {
        &self.base
    }

    /// Host configuration passed to modules
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Compose the service provider for `module`
    ///
    /// Copies the host registrations, lets the module add or shadow
    /// registrations, then builds the result. A module failing to configure
    /// its services yields no provider.
    pub fn create_module_service_provider(&self, module: &dyn Module) -> Result<ServiceProvider> {
        let mut services = ServiceCollection::clone(&self.base);

        module
            .configure_services(&mut services, &self.configuration)
            .map_err(|e| HostError::composition(module.name(), e))?;

        debug!(
            module = %module.name(),
            host_services = self.base.len(),
            total_services = services.len(),
            "Composed module services"
        );

        Ok(services.build())
    }
}
