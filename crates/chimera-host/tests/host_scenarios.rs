//! End-to-end host scenarios

use async_trait::async_trait;
use chimera_core::{
    CapitalizationService, Configuration, ExitCode, Module, ModuleConstructor, ModuleContext,
    ServiceCollection,
};
use chimera_host::{Host, HostError, StaticModuleSource};
use parking_lot::Mutex;
use serde_json::json;
use std::env::consts::DLL_EXTENSION;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Invocations {
    calls: Mutex<Vec<Vec<String>>>,
}

#[derive(Debug, Default)]
struct EchoModule;

#[async_trait]
impl Module for EchoModule {
    fn name(&self) -> &str {
        "Echo"
    }

    fn description(&self) -> &str {
        "Echoes its arguments"
    }

    async fn execute(&self, context: &ModuleContext, args: Vec<String>) -> chimera_core::Result<ExitCode> {
        context.logger().info(format_args!("Echo {}", args.join(" ")));
        if let Some(invocations) = context.get_optional_service::<Invocations>() {
            invocations.calls.lock().push(args);
        }
        Ok(ExitCode::Ok)
    }
}

trait Tag: Send + Sync {
    fn tag(&self) -> &'static str;
}

struct HostTag;

impl Tag for HostTag {
    fn tag(&self) -> &'static str {
        "host"
    }
}

struct ModuleTag;

impl Tag for ModuleTag {
    fn tag(&self) -> &'static str {
        "module"
    }
}

#[derive(Debug, Default)]
struct TaggingModule;

#[async_trait]
impl Module for TaggingModule {
    fn name(&self) -> &str {
        "Tagging"
    }

    fn configure_services(
        &self,
        services: &mut ServiceCollection,
        _configuration: &Configuration,
    ) -> chimera_core::Result<()> {
        services.add_instance::<dyn Tag>(Arc::new(ModuleTag));
        Ok(())
    }

    async fn execute(&self, context: &ModuleContext, _args: Vec<String>) -> chimera_core::Result<ExitCode> {
        let tag = context.get_service::<dyn Tag>()?;
        Ok(if tag.tag() == "module" {
            ExitCode::Ok
        } else {
            ExitCode::Error
        })
    }
}

fn configuration(modules: serde_json::Value) -> Configuration {
    Configuration::from_value(json!({
        "Core": {
            "ModuleRoot": "modules",
            "AvailableModules": modules
        }
    }))
}

fn echo_host(invocations: Arc<Invocations>) -> Host {
    let source = StaticModuleSource::new();
    source.register("Echo", vec![ModuleConstructor::of::<EchoModule>()]);

    Host::builder(configuration(json!([{ "ModuleName": "Echo", "ModulePath": "echo" }])))
        .base_dir("/unused")
        .module_source(Arc::new(source))
        .configure_services(move |services| {
            services.add_instance(invocations);
        })
        .build()
        .unwrap()
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_no_modules_configured() {
    let host = Host::builder(configuration(json!([])))
        .base_dir("/unused")
        .build()
        .unwrap();

    assert!(host.discover().unwrap().is_empty());

    let mut out = Vec::new();
    let code = host.run(Vec::new(), &mut out).await.unwrap();
    assert_eq!(code, ExitCode::Error);
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_list_with_no_arguments() {
    let host = echo_host(Arc::default());

    let mut out = Vec::new();
    let code = host.run(Vec::new(), &mut out).await.unwrap();

    assert_eq!(code, ExitCode::Ok);
    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("Available modules:"));
    assert!(text.contains("Echo - Echoes its arguments"));
}

#[tokio::test]
async fn test_residual_arguments_reach_module() {
    let invocations = Arc::new(Invocations::default());
    let host = echo_host(invocations.clone());

    let mut out = Vec::new();
    let code = host.run(args(&["Echo", "--x", "1"]), &mut out).await.unwrap();

    assert_eq!(code, ExitCode::Ok);
    assert_eq!(*invocations.calls.lock(), vec![args(&["--x", "1"])]);
}

#[tokio::test]
async fn test_selection_is_case_insensitive() {
    let invocations = Arc::new(Invocations::default());
    let host = echo_host(invocations.clone());

    let mut out = Vec::new();
    assert_eq!(host.run(args(&["echo"]), &mut out).await.unwrap(), ExitCode::Ok);
    assert_eq!(host.run(args(&["ECHO", "a"]), &mut out).await.unwrap(), ExitCode::Ok);
    assert_eq!(host.run(args(&["ech"]), &mut out).await.unwrap(), ExitCode::Error);

    assert_eq!(invocations.calls.lock().len(), 2);
}

#[tokio::test]
async fn test_unknown_module_name() {
    let invocations = Arc::new(Invocations::default());
    let host = echo_host(invocations.clone());

    let mut out = Vec::new();
    let code = host.run(args(&["Missing"]), &mut out).await.unwrap();

    assert_eq!(code, ExitCode::Error);
    assert!(invocations.calls.lock().is_empty());
}

#[tokio::test]
async fn test_corrupt_binary_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let module_dir = dir.path().join("modules").join("echo");
    std::fs::create_dir_all(&module_dir).unwrap();
    std::fs::write(
        module_dir.join(format!("Echo.{DLL_EXTENSION}")),
        b"\x7fELF but not really",
    )
    .unwrap();

    let host = Host::builder(configuration(json!([{ "ModuleName": "Echo", "ModulePath": "echo" }])))
        .base_dir(dir.path())
        .build()
        .unwrap();

    assert!(host.discover().unwrap().is_empty());

    let mut out = Vec::new();
    let code = host.run(args(&["Echo"]), &mut out).await.unwrap();
    assert_eq!(code, ExitCode::Error);
}

#[tokio::test]
async fn test_missing_module_root_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let host = Host::builder(configuration(json!([{ "ModuleName": "Echo", "ModulePath": "echo" }])))
        .base_dir(dir.path())
        .build()
        .unwrap();

    let mut out = Vec::new();
    let result = host.run(Vec::new(), &mut out).await;
    assert!(matches!(result, Err(HostError::ModuleRootUnreadable { .. })));
}

#[tokio::test]
async fn test_module_shadowing_is_scoped_to_module() {
    let source = StaticModuleSource::new();
    source.register(
        "bundle",
        vec![ModuleConstructor::of::<TaggingModule>(), ModuleConstructor::of::<EchoModule>()],
    );

    let host = Host::builder(configuration(json!([{ "ModuleName": "bundle", "ModulePath": "" }])))
        .base_dir("/unused")
        .module_source(Arc::new(source))
        .configure_services(|services| {
            services.add_instance::<dyn Tag>(Arc::new(HostTag));
        })
        .build()
        .unwrap();

    let modules = host.discover().unwrap();
    assert_eq!(modules.len(), 2);

    let tagging = host
        .factory()
        .create_module_service_provider(modules[0].module())
        .unwrap();
    let echo = host
        .factory()
        .create_module_service_provider(modules[1].module())
        .unwrap();

    assert_eq!(tagging.get_service::<dyn Tag>().unwrap().tag(), "module");
    assert_eq!(echo.get_service::<dyn Tag>().unwrap().tag(), "host");

    let mut out = Vec::new();
    assert_eq!(host.run(args(&["tagging"]), &mut out).await.unwrap(), ExitCode::Ok);
}

#[tokio::test(start_paused = true)]
async fn test_shared_capitalization_service_is_inherited() {
    let source = StaticModuleSource::new();
    source.register("Echo", vec![ModuleConstructor::of::<EchoModule>()]);

    let host = Host::builder(configuration(json!([{ "ModuleName": "Echo", "ModulePath": "echo" }])))
        .base_dir("/unused")
        .module_source(Arc::new(source))
        .build()
        .unwrap();

    let modules = host.discover().unwrap();
    let provider = host
        .factory()
        .create_module_service_provider(modules[0].module())
        .unwrap();

    let capitalizer = provider.get_service::<dyn CapitalizationService>().unwrap();
    assert_eq!(capitalizer.capitalize("prefix*lower").await, "PREFIX*LOWER");
}
