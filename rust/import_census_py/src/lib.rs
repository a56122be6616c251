//! CPython host for the module census.
//!
//! Rust owns the census pipeline; the embedded interpreter owns
//! `sys.modules`, the bytecode cache format and execution.

pub mod errors;
pub mod host;
pub mod logging;
pub mod module_record;

pub use host::{PythonHost, RESOLVER_SUPPORT_MODULES};
pub use module_record::PyModuleRecord;
