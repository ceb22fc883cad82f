//! Services the host shares with every module

use crate::logging::Logger;
use async_trait::async_trait;
use std::time::Duration;

/// Upper-cases text
#[async_trait]
pub trait CapitalizationService: Send + Sync {
    /// Capitalize `input`
    async fn capitalize(&self, input: &str) -> String;
}

/// Default [`CapitalizationService`] registered by the host
#[derive(Debug)]
pub struct DefaultCapitalizationService {
    logger: Logger,
    delay: Duration,
}

impl DefaultCapitalizationService {
    /// Simulated processing time
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

    /// Create a new capitalization service
    pub fn new(logger: Logger) -> Self {
        Self {
            logger,
            delay: Self::DEFAULT_DELAY,
        }
    }

    /// Override the simulated processing time
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl CapitalizationService for DefaultCapitalizationService {
    async fn capitalize(&self, input: &str) -> String {
        self.logger.info("Starting capitalization");

        let capitalized = input.to_uppercase();
        tokio::time::sleep(self.delay).await;
        capitalized
    }
}
