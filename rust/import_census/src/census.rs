//! The three-phase census: base, static and dynamic module populations.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::driver::{drive, Completion, Executor};
use crate::errors::{CensusError, CensusResult};
use crate::registry::{diff, ModuleRegistry, Snapshot};
use crate::resolver::{resolve_code, CodeLoader, Provenance};
use crate::suppress::{BookkeepingSuppressor, SuppressionOutcome};

/// The program under inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetProgram {
    path: PathBuf,
    module_name: String,
    args: Vec<String>,
}

impl TargetProgram {
    /// Validate `path` and derive the module name it is imported under.
    pub fn from_path(path: impl Into<PathBuf>, args: Vec<String>) -> CensusResult<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(CensusError::Argument(format!(
                "target program {} does not exist",
                path.display()
            )));
        }
        let module_name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| is_module_identifier(stem))
            .ok_or_else(|| {
                CensusError::Argument(format!(
                    "{} cannot be imported: its file stem is not a valid module name",
                    path.display()
                ))
            })?
            .to_string();
        Ok(Self {
            path,
            module_name,
            args,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the target is imported from.
    pub fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Arguments handed to the target as its own command line.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// File name shown in report headings.
    pub fn display_name(&self) -> String {
        self.path.display().to_string()
    }
}

fn is_module_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_alphanumeric())
}

/// A runtime the census can drive: its registry, its code loading
/// facilities and its executor.
pub trait ModuleHost:
    ModuleRegistry + CodeLoader + Executor<Code = <Self as CodeLoader>::Code>
{
    /// Import the target as an ordinary module, running its module-load time
    /// code, and return the registry entity created for it.
    fn import_target(&mut self, target: &TargetProgram) -> CensusResult<Self::Module>;

    /// Modules the host's [`CodeLoader`] may pull into the registry.
    fn bookkeeping_modules(&self) -> &[&str];
}

#[derive(Debug)]
pub struct CensusReport<M> {
    pub target: TargetProgram,
    pub base: Snapshot<M>,
    pub static_imports: Snapshot<M>,
    pub dynamic_imports: Snapshot<M>,
    pub provenance: Provenance,
    pub completion: Completion,
    pub suppression: SuppressionOutcome,
}

/// Run the full census against `host`.
///
/// Coverage of dynamic imports depends entirely on which code paths the
/// target takes while it runs; nothing here inspects code statically.
pub fn run_census<H>(host: &mut H, target: &TargetProgram) -> CensusResult<CensusReport<H::Module>>
where
    H: ModuleHost + ?Sized,
{
    let base = {
        let _guard = tracing::info_span!("census.base").entered();
        let base = host.snapshot()?;
        tracing::info!(modules = base.len(), "Captured base registry");
        base
    };
    if base.contains(target.module_name()) {
        return Err(CensusError::Argument(format!(
            "module name '{}' is already loaded; rename the target program",
            target.module_name()
        )));
    }

    let (module, static_snapshot) = {
        let _guard = tracing::info_span!("census.import", module = target.module_name()).entered();
        let module = host.import_target(target)?;
        let static_snapshot = host.snapshot()?;
        (module, static_snapshot)
    };
    let static_imports = diff(&static_snapshot, &base);
    tracing::info!(modules = static_imports.len(), "Static imports recorded");

    let resolved = {
        let _guard = tracing::info_span!("census.resolve").entered();
        resolve_code(host, &module)?
    };
    tracing::info!(provenance = %resolved.provenance, "Resolved target code");
    let provenance = resolved.provenance.clone();

    let suppression = {
        let _guard = tracing::info_span!("census.suppress").entered();
        // Anything that appeared between the static snapshot and now was
        // loaded by resolution, not by the target.
        let resolved_snapshot = host.snapshot()?;
        let window = diff(&resolved_snapshot, &static_snapshot);
        BookkeepingSuppressor::new(host.bookkeeping_modules().iter().copied())
            .including(window.names())
            .suppress(host, &static_snapshot)?
    };

    let completion = drive(host, resolved)?;

    let dynamic_imports = {
        let _guard = tracing::info_span!("census.dynamic").entered();
        let dynamic_snapshot = host.snapshot()?;
        diff(&dynamic_snapshot, &static_snapshot)
    };
    tracing::info!(modules = dynamic_imports.len(), "Dynamic imports recorded");

    Ok(CensusReport {
        target: target.clone(),
        base,
        static_imports,
        dynamic_imports,
        provenance,
        completion,
        suppression,
    })
}
