//! # ExamplePrepend
//!
//! Example ChimeraKit module. Prepends a prefix and a configured separator to
//! the input, then upper-cases the result through the host's shared
//! [`CapitalizationService`].
//!
//! ```text
//! chimera ExamplePrepend --input lower --prefix prefix
//! ExamplePrepend Result: PREFIX*LOWER
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod cli;
pub mod config;
pub mod service;

pub use cli::PrependArgs;
pub use config::ExamplePrependConfig;
pub use service::{DefaultPrependService, PrependService};

use chimera_core::prelude::*;
use std::sync::Arc;

/// Module prepending a prefix to its input
#[derive(Debug, Default)]
pub struct ExamplePrependModule;

#[async_trait]
impl Module for ExamplePrependModule {
    fn name(&self) -> &str {
        "ExamplePrepend"
    }

    fn description(&self) -> &str {
        "A module that prepends a string and capitalizes it."
    }

    fn configure_services(
        &self,
        services: &mut ServiceCollection,
        configuration: &Configuration,
    ) -> chimera_core::Result<()> {
        services.configure::<ExamplePrependConfig>(configuration, ExamplePrependConfig::SECTION)?;

        services.add_transient::<dyn PrependService, _>(|provider| {
            let loggers = provider.get_service::<dyn LoggerFactory>()?;
            let service = DefaultPrependService::new(
                loggers.logger_for::<DefaultPrependService>(),
                provider.get_service::<ExamplePrependConfig>()?,
                provider.get_service::<dyn CapitalizationService>()?,
            );
            Ok(Arc::new(service) as Arc<dyn PrependService>)
        });

        Ok(())
    }

    async fn execute(&self, context: &ModuleContext, args: Vec<String>) -> chimera_core::Result<ExitCode> {
        let logger = context.logger();
        let service = context.get_service::<dyn PrependService>()?;

        let args = match PrependArgs::parse_args(&args) {
            Ok(args) => args,
            Err(e) => {
                logger.error(&e);
                return Ok(ExitCode::InvalidArguments);
            }
        };

        logger.info(format_args!("Starting {} execution", self.name()));

        match service.process(&args, &context.child_token()).await {
            Ok(result) => {
                println!("ExamplePrepend Result: {result}");
                logger.info(format_args!("Module {} completed successfully", self.name()));
                Ok(ExitCode::Ok)
            }
            Err(e) => {
                logger.error(format_args!("Module {} execution failed: {e}", self.name()));
                Ok(ExitCode::Error)
            }
        }
    }
}

chimera_core::export_modules!(ExamplePrependModule);

#[cfg(test)]
mod tests {
    use super::*;
    use chimera_core::{DefaultCapitalizationService, MODULE_ENTRY_SYMBOL};
    use serde_json::json;
    use std::time::Duration;
    use tokio_util::sync::CancellationToken;

    struct NullLoggers;

    impl LoggerFactory for NullLoggers {
        fn create_logger(&self, category: &str) -> Logger {
            Logger::disabled(category)
        }
    }

    fn host_services() -> ServiceCollection {
        let mut services = ServiceCollection::new();
        services
            .add_instance::<dyn LoggerFactory>(Arc::new(NullLoggers))
            .add_singleton::<dyn CapitalizationService, _>(|_| {
                let service = DefaultCapitalizationService::new(Logger::disabled("Capitalization"))
                    .with_delay(Duration::ZERO);
                Ok(Arc::new(service) as Arc<dyn CapitalizationService>)
            });
        services
    }

    fn context(separator: &str) -> ModuleContext {
        let configuration = Configuration::from_value(json!({
            "ExamplePrepend": { "SeparationCharacter": separator }
        }));

        let mut services = host_services();
        ExamplePrependModule
            .configure_services(&mut services, &configuration)
            .unwrap();

        ModuleContext::new(
            services.build(),
            Logger::disabled("ExamplePrependModule"),
            CancellationToken::new(),
        )
    }

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_identity() {
        let module = ExamplePrependModule;
        assert_eq!(module.name(), "ExamplePrepend");
        assert_eq!(module.description(), "A module that prepends a string and capitalizes it.");
    }

    #[test]
    fn test_configure_services_registers_module_services() {
        let mut services = host_services();
        ExamplePrependModule
            .configure_services(&mut services, &Configuration::default())
            .unwrap();

        assert!(services.contains::<ExamplePrependConfig>());
        assert!(services.contains::<dyn PrependService>());
    }

    #[test]
    fn test_invalid_configuration_fails() {
        let configuration = Configuration::from_value(json!({
            "ExamplePrepend": { "SeparationCharacter": ["not", "a", "string"] }
        }));
        let mut services = host_services();
        let result = ExamplePrependModule.configure_services(&mut services, &configuration);
        assert!(matches!(result, Err(ModuleError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_execute() {
        let code = ExamplePrependModule
            .execute(&context("*"), args(&["-i", "lower", "-p", "prefix"]))
            .await
            .unwrap();
        assert_eq!(code, ExitCode::Ok);
    }

    #[tokio::test]
    async fn test_execute_with_invalid_arguments() {
        let code = ExamplePrependModule
            .execute(&context("*"), args(&["--input", "lower"]))
            .await
            .unwrap();
        assert_eq!(code, ExitCode::InvalidArguments);
    }

    #[tokio::test]
    async fn test_execute_requires_module_services() {
        let context = ModuleContext::new(
            host_services().build(),
            Logger::disabled("ExamplePrependModule"),
            CancellationToken::new(),
        );
        let result = ExamplePrependModule
            .execute(&context, args(&["-i", "lower", "-p", "prefix"]))
            .await;
        assert!(matches!(result, Err(ModuleError::Service(_))));
    }

    #[test]
    fn test_exported_entry_point() {
        let constructors = chimera_module_exports();
        assert_eq!(constructors.len(), 1);
        assert_eq!(constructors[0].construct().unwrap().name(), "ExamplePrepend");
        assert_eq!(MODULE_ENTRY_SYMBOL, b"chimera_module_exports\0");
    }
}
