//! Per-invocation module context

use crate::error::ServiceResult;
use crate::logging::Logger;
use crate::services::ServiceProvider;
use std::any::type_name;
use std::sync::Arc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Handle a module receives for one invocation
///
/// Owns the module's service provider; dropping the context releases every
/// service the invocation created.
#[derive(Debug)]
pub struct ModuleContext {
    services: ServiceProvider,
    logger: Logger,
    cancellation: CancellationToken,
}

impl ModuleContext {
    /// Create a new module context
    pub fn new(services: ServiceProvider, logger: Logger, cancellation: CancellationToken) -> Self {
        Self {
            services,
            logger,
            cancellation,
        }
    }

    /// The module's service provider
    pub fn services(&self) -> &ServiceProvider {
        &self.services
    }

    /// Resolve a required dependency
    ///
    /// An unregistered capability is a contract violation by the module;
    /// propagate the error to abort the invocation.
    pub fn get_service<T>(&self) -> ServiceResult<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.services.get_service::<T>()
    }

    /// Resolve an optional dependency
    ///
    /// Returns `None` when the capability is not registered. A registered
    /// service whose construction fails is logged and also reported as `None`.
    pub fn get_optional_service<T>(&self) -> Option<Arc<T>>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        match self.services.get_optional_service::<T>() {
            Ok(service) => service,
            Err(e) => {
                self.logger.error(format_args!(
                    "Optional service {} could not be constructed: {}",
                    type_name::<T>(),
                    e
                ));
                None
            }
        }
    }

    /// Logger bound to the module's type
    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Check if the host requested cancellation
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Completes when the host requests cancellation
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancellation.cancelled()
    }

    /// Token cancelled together with the invocation; cancelling it does not
    /// affect the host
    pub fn child_token(&self) -> CancellationToken {
        self.cancellation.child_token()
    }
}
