//! Runs the resolved code object in the shared runtime.

use serde::Serialize;

use crate::errors::CensusResult;
use crate::resolver::ResolvedCode;

/// How the target program handed control back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "status", rename_all = "snake_case")]
pub enum Completion {
    /// Fell off the end of its top-level code.
    Returned,
    /// Asked the runtime to exit cleanly (for example `sys.exit(0)`).
    Exited(i32),
}

pub trait Executor {
    type Code;

    /// Run `code` against the runtime's main namespace so imports it performs
    /// land in the shared registry. Blocks for as long as the program runs.
    fn execute(&mut self, code: Self::Code) -> CensusResult<Completion>;
}

/// Execute the resolved code exactly once.
pub fn drive<E>(executor: &mut E, resolved: ResolvedCode<E::Code>) -> CensusResult<Completion>
where
    E: Executor + ?Sized,
{
    let span = tracing::info_span!("census.execute", provenance = %resolved.provenance);
    let _guard = span.enter();
    tracing::info!("Executing target; exercise its features, then quit it normally");
    let completion = executor.execute(resolved.code)?;
    tracing::info!(?completion, "Target returned control");
    Ok(completion)
}
