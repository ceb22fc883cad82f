//! Module discovery and loading
//!
//! Every configured [`ModuleDescriptor`] resolves to a binary path below the
//! module root. A [`ModuleSource`] opens the binary and returns the module
//! constructors it exports; the loader then constructs one instance per
//! constructor. A descriptor that fails to load, or a constructor that fails,
//! is logged and skipped. Only host-level misconfiguration fails discovery.

use crate::error::{HostError, LoadError, Result};
use chimera_config::{CoreConfig, ModuleDescriptor};
use chimera_core::{
    build_fingerprint, panic_message, Module, ModuleConstructor, ModuleEntryFn, ModuleFingerprintFn,
    MODULE_ENTRY_SYMBOL, MODULE_FINGERPRINT_SYMBOL,
};
use libloading::Library;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::env::consts::DLL_EXTENSION;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Directory containing the running executable
pub fn executable_directory() -> Result<PathBuf> {
    let exe = std::env::current_exe().map_err(|e| HostError::ExecutableDirectory(e.to_string()))?;
    exe.parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| HostError::ExecutableDirectory(format!("{} has no parent", exe.display())))
}

/// Module constructors exported by one opened binary
pub struct ModuleLibrary {
    constructors: Vec<ModuleConstructor>,
    library: Option<Arc<Library>>,
}

impl fmt::Debug for ModuleLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLibrary")
            .field("constructors", &self.constructors)
            .field("dynamic", &self.library.is_some())
            .finish()
    }
}

impl ModuleLibrary {
    /// Wrap constructors linked into the host binary
    pub fn from_constructors(constructors: Vec<ModuleConstructor>) -> Self {
        Self {
            constructors,
            library: None,
        }
    }

    /// Exported constructors, in export order
    pub fn constructors(&self) -> &[ModuleConstructor] {
        &self.constructors
    }
}

/// Opens module binaries
pub trait ModuleSource: Send + Sync + fmt::Debug {
    /// Open the binary for `descriptor` at `path`
    fn open(&self, descriptor: &ModuleDescriptor, path: &Path) -> Result<ModuleLibrary, LoadError>;

    /// Check if discovery needs the module root to exist
    fn requires_module_root(&self) -> bool {
        true
    }
}

/// Loads module binaries as dynamic libraries
///
/// Each binary gets its own library handle, opened with local symbol
/// visibility, so modules do not resolve each other's symbols. On Unix all
/// symbols are bound at load time, so a binary with unresolvable imports is
/// rejected here instead of failing mid-execution. The handle stays open for
/// as long as any module constructed from it is alive.
///
/// A binary must export the same build fingerprint as the host's
/// `chimera-core`; otherwise none of its service lookups could succeed.
#[derive(Debug, Default, Clone, Copy)]
pub struct DynamicLibrarySource;

impl DynamicLibrarySource {
    /// Create a new dynamic library source
    pub fn new() -> Self {
        Self
    }
}

impl ModuleSource for DynamicLibrarySource {
    #[allow(unsafe_code)]
    fn open(&self, _descriptor: &ModuleDescriptor, path: &Path) -> Result<ModuleLibrary, LoadError> {
        if !path.is_file() {
            return Err(LoadError::NotFound(path.to_path_buf()));
        }

        let library = open_library(path)?;

        // SAFETY: `export_modules!` generates both symbols with these
        // signatures. The copied function pointers are only called while
        // `library` is alive.
        let fingerprint: ModuleFingerprintFn =
            unsafe { library.get::<ModuleFingerprintFn>(MODULE_FINGERPRINT_SYMBOL) }
                .map(|symbol| *symbol)
                .map_err(|e| LoadError::incompatible(path, e))?;
        let entry: ModuleEntryFn = unsafe { library.get::<ModuleEntryFn>(MODULE_ENTRY_SYMBOL) }
            .map(|symbol| *symbol)
            .map_err(|e| LoadError::missing_entry_point(path, e))?;

        if fingerprint() != build_fingerprint() {
            return Err(LoadError::incompatible(
                path,
                "built against a different chimera-core build than the host",
            ));
        }

        // The generated entry point only lists constructors; construction
        // itself is panic-contained inside the module binary.
        let constructors = entry();

        Ok(ModuleLibrary {
            constructors,
            library: Some(Arc::new(library)),
        })
    }
}

// SAFETY (both variants): module binaries are trusted code built with the
// same toolchain as the host. Their initialisers run here.
#[cfg(unix)]
#[allow(unsafe_code)]
fn open_library(path: &Path) -> Result<Library, LoadError> {
    use libloading::os::unix::{Library as UnixLibrary, RTLD_LOCAL, RTLD_NOW};

    unsafe { UnixLibrary::open(Some(path), RTLD_NOW | RTLD_LOCAL) }
        .map(Library::from)
        .map_err(|e| LoadError::library(path, e))
}

#[cfg(not(unix))]
#[allow(unsafe_code)]
fn open_library(path: &Path) -> Result<Library, LoadError> {
    unsafe { Library::new(path) }.map_err(|e| LoadError::library(path, e))
}

/// In-process module registry keyed by descriptor name
///
/// Used for modules linked into the host binary and for tests. Descriptors
/// resolve by exact name; the binary path is ignored.
#[derive(Debug, Default)]
pub struct StaticModuleSource {
    modules: RwLock<HashMap<String, Vec<ModuleConstructor>>>,
}

impl StaticModuleSource {
    /// Create a new, empty static source
    pub fn new() -> Self {
        Self::default()
    }

    /// Register constructors under a descriptor name, replacing any previous entry
    pub fn register(&self, name: impl Into<String>, constructors: Vec<ModuleConstructor>) -> &Self {
        self.modules.write().insert(name.into(), constructors);
        self
    }

    /// Register the constructors returned by a module entry point
    pub fn register_entry(&self, name: impl Into<String>, entry: ModuleEntryFn) -> &Self {
        self.register(name, entry())
    }

    /// Number of registered names
    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    /// Check if nothing is registered
    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }
}

impl ModuleSource for StaticModuleSource {
    fn open(&self, descriptor: &ModuleDescriptor, _path: &Path) -> Result<ModuleLibrary, LoadError> {
        self.modules
            .read()
            .get(&descriptor.name)
            .cloned()
            .map(ModuleLibrary::from_constructors)
            .ok_or_else(|| LoadError::unknown_module(&descriptor.name))
    }

    fn requires_module_root(&self) -> bool {
        false
    }
}

/// A constructed module together with the binary it came from
pub struct LoadedModule {
    // Dropped before `library` so module code is never unloaded underneath it.
    module: Box<dyn Module>,
    descriptor: ModuleDescriptor,
    library: Option<Arc<Library>>,
}

impl fmt::Debug for LoadedModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModule")
            .field("name", &self.module.name())
            .field("type", &self.module.type_name())
            .field("descriptor", &self.descriptor)
            .field("dynamic", &self.library.is_some())
            .finish()
    }
}

impl LoadedModule {
    /// The module instance
    pub fn module(&self) -> &dyn Module {
        self.module.as_ref()
    }

    /// Module name
    pub fn name(&self) -> &str {
        self.module.name()
    }

    /// Module description
    pub fn description(&self) -> &str {
        self.module.description()
    }

    /// Descriptor the module was loaded from
    pub fn descriptor(&self) -> &ModuleDescriptor {
        &self.descriptor
    }
}

/// Turns the configured module manifest into module instances
pub struct ModuleLoader {
    config: CoreConfig,
    base_dir: PathBuf,
    source: Arc<dyn ModuleSource>,
}

impl fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("module_root", &self.module_root())
            .field("modules", &self.config.available_modules.len())
            .field("source", &self.source)
            .finish()
    }
}

impl ModuleLoader {
    /// Create a loader resolving paths from the executable directory
    pub fn new(config: CoreConfig) -> Result<Self> {
        Ok(Self::with_base_dir(config, executable_directory()?))
    }

    /// Create a loader resolving paths from `base_dir`
    pub fn with_base_dir(config: CoreConfig, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            base_dir: base_dir.into(),
            source: Arc::new(DynamicLibrarySource::new()),
        }
    }

    /// Replace the module source
    pub fn with_source(mut self, source: Arc<dyn ModuleSource>) -> Self {
        self.source = source;
        self
    }

    /// Configured module manifest
    pub fn descriptors(&self) -> &[ModuleDescriptor] {
        &self.config.available_modules
    }

    /// Resolved module root
    pub fn module_root(&self) -> PathBuf {
        self.base_dir.join(&self.config.module_root)
    }

    /// Binary path of `descriptor`
    ///
    /// `<base>/<module root>/<relative path>/<name>.<platform extension>`
    pub fn module_path(&self, descriptor: &ModuleDescriptor) -> PathBuf {
        self.module_root()
            .join(&descriptor.relative_path)
            .join(format!("{}.{}", descriptor.name, DLL_EXTENSION))
    }

    /// Load every configured module
    ///
    /// Modules are returned in descriptor order, then in export order within
    /// each binary. Descriptors are processed one at a time.
    pub fn discover(&self) -> Result<Vec<LoadedModule>> {
        if self.config.available_modules.is_empty() {
            info!("No modules configured");
            return Ok(Vec::new());
        }

        if self.source.requires_module_root() {
            self.check_module_root()?;
        }

        let mut modules = Vec::new();

        for descriptor in &self.config.available_modules {
            let path = self.module_path(descriptor);
            debug!(module = %descriptor.name, path = %path.display(), "Loading module");

            let library = match self.source.open(descriptor, &path) {
                Ok(library) => library,
                Err(e) => {
                    warn!(
                        module = %descriptor.name,
                        path = %path.display(),
                        error = %e,
                        "Failed to load module, skipping"
                    );
                    continue;
                }
            };

            for constructor in library.constructors() {
                // Constructors from `ModuleConstructor::of` already contain
                // their panics; this covers hand-written in-process ones.
                match panic::catch_unwind(AssertUnwindSafe(|| constructor.construct())) {
                    Ok(Ok(module)) => {
                        debug!(
                            module = %module.name(),
                            module_type = constructor.type_name(),
                            "Constructed module"
                        );
                        modules.push(LoadedModule {
                            module,
                            descriptor: descriptor.clone(),
                            library: library.library.clone(),
                        });
                    }
                    Ok(Err(e)) => {
                        error!(
                            module_type = constructor.type_name(),
                            path = %path.display(),
                            error = %e,
                            "Failed to construct module"
                        );
                    }
                    Err(payload) => {
                        error!(
                            module_type = constructor.type_name(),
                            path = %path.display(),
                            panic = %panic_message(payload.as_ref()),
                            "Module constructor panicked"
                        );
                    }
                }
            }
        }

        info!(count = modules.len(), "Module discovery completed");
        Ok(modules)
    }

    fn check_module_root(&self) -> Result<()> {
        let root = self.module_root();
        match fs::metadata(&root) {
            Ok(metadata) if metadata.is_dir() => Ok(()),
            Ok(_) => Err(HostError::module_root(&root, "not a directory")),
            Err(e) => Err(HostError::module_root(&root, e)),
        }
    }
}
