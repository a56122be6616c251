use std::sync::Arc;

use crate::registry::snapshot::Snapshot;

/// Entries of `later` whose name does not occur in `earlier`.
///
/// Name-based only: a name present in both is excluded even when the entity
/// behind it was replaced.
pub fn diff<M>(later: &Snapshot<M>, earlier: &Snapshot<M>) -> Snapshot<M> {
    later
        .iter()
        .filter(|(name, _)| !earlier.contains(name))
        .map(|(name, module)| (name.clone(), Arc::clone(module)))
        .collect()
}
