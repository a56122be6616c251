use std::path::{Path, PathBuf};

use import_census::entity::ModuleEntity;
use pyo3::prelude::*;

/// One `sys.modules` value, with the attributes the census reads from it.
#[derive(Debug)]
pub struct PyModuleRecord {
    handle: Py<PyAny>,
    file: Option<PathBuf>,
    cached: Option<PathBuf>,
}

impl PyModuleRecord {
    pub fn new(handle: Py<PyAny>, file: Option<PathBuf>, cached: Option<PathBuf>) -> Self {
        Self {
            handle,
            file,
            cached,
        }
    }

    /// Read `__file__` and `__cached__` from `module`. Missing, `None` or
    /// non-path values count as absent.
    pub fn capture(module: &Bound<'_, PyAny>) -> Self {
        Self {
            handle: module.clone().unbind(),
            file: path_attr(module, "__file__"),
            cached: path_attr(module, "__cached__"),
        }
    }

    pub fn handle(&self) -> &Py<PyAny> {
        &self.handle
    }
}

fn path_attr(module: &Bound<'_, PyAny>, name: &str) -> Option<PathBuf> {
    let value = module.getattr(name).ok()?;
    if value.is_none() {
        return None;
    }
    value.extract::<PathBuf>().ok()
}

impl ModuleEntity for PyModuleRecord {
    fn origin(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    fn cached_artifact(&self) -> Option<&Path> {
        self.cached.as_deref()
    }
}
