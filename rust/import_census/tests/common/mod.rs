//! Scripted in-memory host shared by the integration tests.
//!
//! Not every test file uses every helper.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use import_census::driver::{Completion, Executor};
use import_census::registry::{InMemoryRegistry, ModuleRegistry, Snapshot};
use import_census::resolver::{ArtifactHeader, CodeLoader, Magic};
use import_census::{CensusError, CensusResult, HostFailure, ModuleHost, TargetProgram};

pub const RUNTIME_MAGIC: Magic = [0x6f, 0x0d, 0x0d, 0x0a];

#[derive(Debug, Clone, Default)]
pub struct FakeModule {
    pub origin: Option<PathBuf>,
    pub cached: Option<PathBuf>,
}

impl FakeModule {
    pub fn builtin() -> Self {
        Self::default()
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: Some(path.into()),
            cached: None,
        }
    }

    pub fn with_cache(mut self, path: impl Into<PathBuf>) -> Self {
        self.cached = Some(path.into());
        self
    }
}

impl import_census::entity::ModuleEntity for FakeModule {
    fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    fn cached_artifact(&self) -> Option<&Path> {
        self.cached.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCode {
    Cached(Vec<u8>),
    Compiled(String),
}

/// Host whose "program" is described by data: what importing it loads, and
/// what running it loads when the user supplies input.
pub struct ScriptedHost {
    pub registry: InMemoryRegistry<FakeModule>,
    pub target_module: FakeModule,
    pub static_imports: Vec<(String, FakeModule)>,
    pub input_imports: Vec<(String, FakeModule)>,
    pub user_supplies_input: bool,
    pub import_failure: Option<String>,
    pub execution_failure: Option<String>,
    pub exit_status: Option<i32>,
    pub compiled_paths: Vec<PathBuf>,
    pub cached_loads: usize,
    pub executions: Vec<FakeCode>,
}

impl ScriptedHost {
    /// A host whose base registry holds a typical interpreter start-up set.
    pub fn new(target_module: FakeModule) -> Self {
        let mut registry = InMemoryRegistry::new();
        registry.insert("builtins", FakeModule::builtin());
        registry.insert("sys", FakeModule::builtin());
        registry.insert("marshal", FakeModule::builtin());
        registry.insert("site", FakeModule::file("/usr/lib/python3/site.py"));
        registry.insert("codecs", FakeModule::file("/usr/lib/python3/codecs.py"));
        Self {
            registry,
            target_module,
            static_imports: Vec::new(),
            input_imports: Vec::new(),
            user_supplies_input: false,
            import_failure: None,
            execution_failure: None,
            exit_status: None,
            compiled_paths: Vec::new(),
            cached_loads: 0,
            executions: Vec::new(),
        }
    }

    pub fn loads_on_import(mut self, name: &str, module: FakeModule) -> Self {
        self.static_imports.push((name.to_string(), module));
        self
    }

    pub fn loads_on_input(mut self, name: &str, module: FakeModule) -> Self {
        self.input_imports.push((name.to_string(), module));
        self
    }
}

impl ModuleRegistry for ScriptedHost {
    type Module = FakeModule;

    fn snapshot(&self) -> CensusResult<Snapshot<FakeModule>> {
        self.registry.snapshot()
    }

    fn remove(&mut self, name: &str) -> CensusResult<bool> {
        self.registry.remove(name)
    }
}

impl CodeLoader for ScriptedHost {
    type Code = FakeCode;

    fn expected_magic(&mut self) -> CensusResult<Magic> {
        self.registry.insert("importlib", FakeModule::file("/usr/lib/python3/importlib/__init__.py"));
        self.registry.insert("importlib.util", FakeModule::file("/usr/lib/python3/importlib/util.py"));
        // A transitive dependency that is on no allow-list.
        self.registry.insert("functools", FakeModule::file("/usr/lib/python3/functools.py"));
        Ok(RUNTIME_MAGIC)
    }

    fn load_cached(&mut self, _header: &ArtifactHeader, blob: &[u8]) -> CensusResult<FakeCode> {
        self.cached_loads += 1;
        Ok(FakeCode::Cached(blob.to_vec()))
    }

    fn compile_source(&mut self, text: &str, path: &Path) -> CensusResult<FakeCode> {
        self.compiled_paths.push(path.to_path_buf());
        if text.contains("def (") {
            return Err(CensusError::Compile(HostFailure::new("SyntaxError: invalid syntax")));
        }
        Ok(FakeCode::Compiled(text.to_string()))
    }
}

impl Executor for ScriptedHost {
    type Code = FakeCode;

    fn execute(&mut self, code: FakeCode) -> CensusResult<Completion> {
        self.executions.push(code);
        if self.user_supplies_input {
            for (name, module) in self.input_imports.clone() {
                self.registry.insert(name, module);
            }
        }
        if let Some(message) = &self.execution_failure {
            return Err(CensusError::Execution(HostFailure::new(message.clone())));
        }
        Ok(match self.exit_status {
            Some(status) => Completion::Exited(status),
            None => Completion::Returned,
        })
    }
}

impl ModuleHost for ScriptedHost {
    fn import_target(&mut self, target: &TargetProgram) -> CensusResult<FakeModule> {
        if let Some(message) = &self.import_failure {
            return Err(CensusError::TargetLoad(HostFailure::new(message.clone())));
        }
        for (name, module) in self.static_imports.clone() {
            self.registry.insert(name, module);
        }
        self.registry
            .insert(target.module_name(), self.target_module.clone());
        Ok(self.target_module.clone())
    }

    fn bookkeeping_modules(&self) -> &[&str] {
        &["imp", "importlib", "importlib.util", "marshal"]
    }
}

/// Write `t.py` (and optionally a cache artifact) into `dir`.
pub fn write_target(dir: &Path, source: &str, cache: Option<&[u8]>) -> (PathBuf, FakeModule) {
    let path = dir.join("t.py");
    std::fs::write(&path, source).expect("write target source");
    let mut module = FakeModule::file(&path);
    if let Some(bytes) = cache {
        let cache_dir = dir.join("__pycache__");
        std::fs::create_dir_all(&cache_dir).expect("create cache dir");
        let cache_path = cache_dir.join("t.fake-1.pyc");
        std::fs::write(&cache_path, bytes).expect("write cache");
        module = module.with_cache(cache_path);
    }
    (path, module)
}

pub fn artifact_bytes(magic: Magic, body: &[u8]) -> Vec<u8> {
    let mut bytes = magic.to_vec();
    bytes.extend_from_slice(&[0x11, 0x22, 0x33, 0x44]);
    bytes.extend_from_slice(&[0, 0, 0, 0]);
    bytes.extend_from_slice(body);
    bytes
}
