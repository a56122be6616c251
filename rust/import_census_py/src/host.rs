//! `import_census` traits implemented against an embedded CPython.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use import_census::driver::{Completion, Executor};
use import_census::registry::{ModuleRegistry, Snapshot};
use import_census::resolver::{ArtifactHeader, CodeLoader, Magic, HEADER_LEN};
use import_census::{
    CensusConfig, CensusError, CensusResult, HostFailure, ModuleHost, TargetProgram,
};
use pyo3::exceptions::PySystemExit;
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict, PyList};

use crate::errors::{census_err, host_failure};
use crate::module_record::PyModuleRecord;

/// Modules that cache introspection and code deserialization may add to
/// `sys.modules`.
pub const RESOLVER_SUPPORT_MODULES: &[&str] = &[
    "imp",
    "importlib",
    "importlib._abc",
    "importlib._bootstrap",
    "importlib._bootstrap_external",
    "importlib.machinery",
    "importlib.util",
    "marshal",
];

/// Width of the source-size word that follows the common 12-byte header in
/// PEP 552 (3.7+) bytecode files.
const PEP552_EXTRA_HEADER: usize = 4;

pub struct PythonHost<'py> {
    py: Python<'py>,
    clean_exit_completes: bool,
    extra_header: usize,
    target_path: Option<PathBuf>,
}

impl<'py> PythonHost<'py> {
    pub fn new(py: Python<'py>, config: &CensusConfig) -> Self {
        let extra_header = if py.version_info() >= (3, 7) {
            PEP552_EXTRA_HEADER
        } else {
            0
        };
        Self {
            py,
            clean_exit_completes: config.clean_exit_completes,
            extra_header,
            target_path: None,
        }
    }

    pub fn python(&self) -> Python<'py> {
        self.py
    }

    fn sys_modules(&self) -> PyResult<Bound<'py, PyDict>> {
        Ok(self
            .py
            .import("sys")?
            .getattr("modules")?
            .downcast_into::<PyDict>()?)
    }

    fn prepare_sys(&self, target: &TargetProgram) -> PyResult<()> {
        let sys = self.py.import("sys")?;
        let directory = target.directory().to_string_lossy().into_owned();
        sys.getattr("path")?.call_method1("insert", (0, directory))?;
        let mut argv = vec![target.path().to_string_lossy().into_owned()];
        argv.extend(target.args().iter().cloned());
        sys.setattr("argv", PyList::new(self.py, argv)?)?;
        Ok(())
    }

    fn run_in_main(&self, code: &Bound<'py, PyAny>) -> PyResult<()> {
        let globals = self.py.import("__main__")?.dict();
        if let Some(path) = &self.target_path {
            globals.set_item("__file__", path.to_string_lossy().into_owned())?;
        }
        self.py
            .import("builtins")?
            .getattr("exec")?
            .call1((code, globals))?;
        Ok(())
    }

    fn flush_streams(&self) {
        let Ok(sys) = self.py.import("sys") else {
            return;
        };
        for name in ["stdout", "stderr"] {
            let Ok(stream) = sys.getattr(name) else {
                continue;
            };
            if stream.is_none() {
                continue;
            }
            if let Err(err) = stream.call_method0("flush") {
                tracing::debug!(stream = name, error = %err, "Failed to flush Python stream");
            }
        }
    }
}

fn exit_status(py: Python<'_>, err: &PyErr) -> i32 {
    let Ok(code) = err.value(py).getattr("code") else {
        return 1;
    };
    if code.is_none() {
        return 0;
    }
    code.extract::<i32>().unwrap_or(1)
}

impl<'py> ModuleRegistry for PythonHost<'py> {
    type Module = PyModuleRecord;

    fn snapshot(&self) -> CensusResult<Snapshot<PyModuleRecord>> {
        let py = self.py;
        let modules = self
            .sys_modules()
            .and_then(|modules| modules.copy())
            .map_err(census_err(py, CensusError::Registry))?;
        let mut entries = Vec::with_capacity(modules.len());
        for (name, module) in modules.iter() {
            let Ok(name) = name.extract::<String>() else {
                continue;
            };
            entries.push((name, Arc::new(PyModuleRecord::capture(&module))));
        }
        Ok(entries.into_iter().collect())
    }

    fn remove(&mut self, name: &str) -> CensusResult<bool> {
        let py = self.py;
        let modules = self
            .sys_modules()
            .map_err(census_err(py, CensusError::Registry))?;
        if !modules
            .contains(name)
            .map_err(census_err(py, CensusError::Registry))?
        {
            return Ok(false);
        }
        modules
            .del_item(name)
            .map_err(census_err(py, CensusError::Registry))?;
        Ok(true)
    }
}

impl<'py> CodeLoader for PythonHost<'py> {
    type Code = Py<PyAny>;

    fn expected_magic(&mut self) -> CensusResult<Magic> {
        let py = self.py;
        let magic = py
            .import("importlib.util")
            .and_then(|util| util.getattr("MAGIC_NUMBER"))
            .map_err(census_err(py, CensusError::CacheLoad))?;
        let bytes = magic
            .downcast::<PyBytes>()
            .map_err(|err| CensusError::CacheLoad(HostFailure::new(err.to_string())))?
            .as_bytes();
        bytes.try_into().map_err(|_| {
            CensusError::CacheLoad(HostFailure::new(format!(
                "importlib.util.MAGIC_NUMBER has {} bytes, expected 4",
                bytes.len()
            )))
        })
    }

    fn header_len(&self) -> usize {
        HEADER_LEN + self.extra_header
    }

    fn load_cached(&mut self, _header: &ArtifactHeader, blob: &[u8]) -> CensusResult<Py<PyAny>> {
        let py = self.py;
        let blob = PyBytes::new(py, blob);
        py.import("marshal")
            .and_then(|marshal| marshal.call_method1("loads", (blob,)))
            .map(Bound::unbind)
            .map_err(census_err(py, CensusError::CacheLoad))
    }

    fn compile_source(&mut self, text: &str, path: &Path) -> CensusResult<Py<PyAny>> {
        let py = self.py;
        let filename = path.to_string_lossy().into_owned();
        py.import("builtins")
            .and_then(|builtins| builtins.getattr("compile"))
            .and_then(|compile| compile.call1((text, filename, "exec")))
            .map(Bound::unbind)
            .map_err(census_err(py, CensusError::Compile))
    }
}

impl<'py> Executor for PythonHost<'py> {
    type Code = Py<PyAny>;

    fn execute(&mut self, code: Py<PyAny>) -> CensusResult<Completion> {
        let py = self.py;
        let result = self.run_in_main(code.bind(py));
        self.flush_streams();
        match result {
            Ok(()) => Ok(Completion::Returned),
            Err(err) if self.clean_exit_completes && err.is_instance_of::<PySystemExit>(py) => {
                match exit_status(py, &err) {
                    0 => Ok(Completion::Exited(0)),
                    status => {
                        tracing::warn!(status, "Target exited with a failure status");
                        Err(CensusError::Execution(host_failure(py, &err)))
                    }
                }
            }
            Err(err) => Err(CensusError::Execution(host_failure(py, &err))),
        }
    }
}

impl<'py> ModuleHost for PythonHost<'py> {
    fn import_target(&mut self, target: &TargetProgram) -> CensusResult<PyModuleRecord> {
        let py = self.py;
        self.prepare_sys(target)
            .map_err(census_err(py, CensusError::TargetLoad))?;
        let module = py
            .import(target.module_name())
            .map_err(census_err(py, CensusError::TargetLoad))?;
        self.target_path = Some(target.path().to_path_buf());
        Ok(PyModuleRecord::capture(module.as_any()))
    }

    fn bookkeeping_modules(&self) -> &[&str] {
        RESOLVER_SUPPORT_MODULES
    }
}
