//! Prepend service

use crate::cli::PrependArgs;
use crate::config::ExamplePrependConfig;
use async_trait::async_trait;
use chimera_core::{CapitalizationService, Logger, ModuleError, Result};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Prepends the configured prefix and capitalizes the result
#[async_trait]
pub trait PrependService: Send + Sync {
    /// Process one request
    async fn process(&self, args: &PrependArgs, cancellation: &CancellationToken) -> Result<String>;
}

/// Default [`PrependService`]
#[derive(Clone)]
pub struct DefaultPrependService {
    logger: Logger,
    config: Arc<ExamplePrependConfig>,
    capitalization: Arc<dyn CapitalizationService>,
}

impl std::fmt::Debug for DefaultPrependService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultPrependService")
            .field("config", &self.config)
            .finish()
    }
}

impl DefaultPrependService {
    /// Create a new prepend service
    pub fn new(
        logger: Logger,
        config: Arc<ExamplePrependConfig>,
        capitalization: Arc<dyn CapitalizationService>,
    ) -> Self {
        Self {
            logger,
            config,
            capitalization,
        }
    }
}

#[async_trait]
impl PrependService for DefaultPrependService {
    async fn process(&self, args: &PrependArgs, cancellation: &CancellationToken) -> Result<String> {
        self.logger.info("ExamplePrependService starts processing");

        if cancellation.is_cancelled() {
            return Err(ModuleError::Cancelled);
        }

        let prepended = format!("{}{}{}", args.prefix, self.config.separation_character, args.input);

        // Timers belong to the host runtime, so only the shared service waits.
        tokio::select! {
            biased;
            _ = cancellation.cancelled() => Err(ModuleError::Cancelled),
            capitalized = self.capitalization.capitalize(&prepended) => Ok(capitalized),
        }
    }
}
