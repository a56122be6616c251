//! Removal of the census's own bookkeeping imports from the shared registry.

use serde::Serialize;

use crate::errors::CensusResult;
use crate::registry::{ModuleRegistry, Snapshot};

/// What a suppression pass did with each allow-listed name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SuppressionOutcome {
    /// Loaded by code resolution and removed.
    pub removed: Vec<String>,
    /// Already loaded before resolution began, so not ours to remove.
    pub retained: Vec<String>,
    /// Never loaded.
    pub absent: Vec<String>,
}

/// Modules that belong to the code resolver's machinery: a fixed allow-list,
/// optionally widened with whatever resolution was observed to load.
#[derive(Debug, Clone)]
pub struct BookkeepingSuppressor {
    names: Vec<String>,
}

impl BookkeepingSuppressor {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        Self { names }
    }

    /// Widen the allow-list with `observed`, the names that appeared in the
    /// registry while code resolution ran. Support facilities drag in their
    /// own dependencies, which no fixed list can anticipate.
    pub fn including<I, S>(mut self, observed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(observed.into_iter().map(Into::into));
        self.names.sort();
        self.names.dedup();
        self
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Remove every allow-listed name that is in the registry now but was
    /// not in `before`, the snapshot taken just ahead of code resolution.
    ///
    /// Tolerant of names that were never loaded, and idempotent.
    pub fn suppress<R>(
        &self,
        registry: &mut R,
        before: &Snapshot<R::Module>,
    ) -> CensusResult<SuppressionOutcome>
    where
        R: ModuleRegistry + ?Sized,
    {
        let current = registry.snapshot()?;
        let mut outcome = SuppressionOutcome::default();
        for name in &self.names {
            if !current.contains(name) {
                outcome.absent.push(name.clone());
            } else if before.contains(name) {
                outcome.retained.push(name.clone());
            } else if registry.remove(name)? {
                tracing::debug!(module = %name, "Suppressed resolver bookkeeping module");
                outcome.removed.push(name.clone());
            } else {
                outcome.absent.push(name.clone());
            }
        }
        Ok(outcome)
    }
}
