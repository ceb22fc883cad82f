//! Module binary whose modules panic while being built or run

#![warn(missing_docs)]

use chimera_core::prelude::*;

/// Module that panics during execution
#[derive(Debug, Default)]
pub struct FaultyModule;

#[async_trait]
impl Module for FaultyModule {
    fn name(&self) -> &str {
        "Faulty"
    }

    fn description(&self) -> &str {
        "Panics when executed"
    }

    async fn execute(&self, _context: &ModuleContext, args: Vec<String>) -> chimera_core::Result<ExitCode> {
        panic!("faulty module invoked with {args:?}")
    }
}

/// Module that panics in its constructor
#[derive(Debug)]
pub struct UnbuildableModule;

impl Default for UnbuildableModule {
    fn default() -> Self {
        panic!("unbuildable module cannot be constructed")
    }
}

#[async_trait]
impl Module for UnbuildableModule {
    fn name(&self) -> &str {
        "Unbuildable"
    }

    async fn execute(&self, _context: &ModuleContext, _args: Vec<String>) -> chimera_core::Result<ExitCode> {
        Ok(ExitCode::Ok)
    }
}

chimera_core::export_modules!(UnbuildableModule, FaultyModule);
