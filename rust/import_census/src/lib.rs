//! Module census for a target program.
//!
//! Finds every module a program depends on by watching a shared module
//! registry grow:
//! 1. base: what the runtime loaded before the target was touched
//! 2. static: what importing the target added
//! 3. dynamic: what running the target's logic added afterwards
//!
//! The registry, code loading and execution are traits so the pipeline can
//! run against an embedded interpreter or an in-memory stand-in.

pub mod census;
pub mod config;
pub mod driver;
pub mod entity;
pub mod errors;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod suppress;

pub use census::{run_census, CensusReport, ModuleHost, TargetProgram};
pub use config::{CensusConfig, ReportFormat};
pub use errors::{CensusError, CensusResult, HostFailure};
