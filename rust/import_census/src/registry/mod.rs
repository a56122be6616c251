//! Point-in-time copies of the module registry and their differences.

pub mod diff;
pub mod snapshot;

pub use diff::diff;
pub use snapshot::{InMemoryRegistry, ModuleRegistry, Snapshot};
