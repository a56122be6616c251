use import_census::{CensusError, HostFailure};
use pyo3::prelude::*;

/// Capture a Python exception as a [`HostFailure`], keeping its formatted
/// traceback when one is attached.
pub fn host_failure(py: Python<'_>, err: &PyErr) -> HostFailure {
    let traceback = err.traceback(py).and_then(|tb| tb.format().ok());
    HostFailure::new(err.to_string()).with_traceback(traceback)
}

/// Adapter for `map_err`: wraps a `PyErr` into the census error for `stage`.
///
/// ```ignore
/// py.import(name).map_err(census_err(py, CensusError::TargetLoad))?;
/// ```
pub fn census_err<'py>(
    py: Python<'py>,
    stage: fn(HostFailure) -> CensusError,
) -> impl FnOnce(PyErr) -> CensusError + 'py {
    move |err| stage(host_failure(py, &err))
}
