use std::collections::btree_map;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::entity::ModuleEntity;
use crate::errors::CensusResult;

/// Immutable copy of a module registry taken at one instant.
///
/// Entities are shared, not cloned: a snapshot holds the same handles the
/// registry held, but later inserts and removals in the registry do not
/// reach it.
#[derive(Debug)]
pub struct Snapshot<M> {
    entries: BTreeMap<String, Arc<M>>,
}

impl<M> Snapshot<M> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<M>> {
        self.entries.get(name)
    }

    /// Module names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Arc<M>> {
        self.entries.iter()
    }
}

impl<M> Clone for Snapshot<M> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

impl<M> Default for Snapshot<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> FromIterator<(String, Arc<M>)> for Snapshot<M> {
    fn from_iter<I: IntoIterator<Item = (String, Arc<M>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a, M> IntoIterator for &'a Snapshot<M> {
    type Item = (&'a String, &'a Arc<M>);
    type IntoIter = btree_map::Iter<'a, String, Arc<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// The process-wide name → module mapping shared by the census and the
/// program under inspection.
pub trait ModuleRegistry {
    type Module: ModuleEntity;

    fn snapshot(&self) -> CensusResult<Snapshot<Self::Module>>;

    /// Drop `name` from the registry. Returns `false` when it was not there.
    fn remove(&mut self, name: &str) -> CensusResult<bool>;
}

/// Registry backed by an ordinary map, for embedders without a dynamic
/// loader and for tests.
#[derive(Debug)]
pub struct InMemoryRegistry<M> {
    entries: BTreeMap<String, Arc<M>>,
}

impl<M> InMemoryRegistry<M> {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, module: M) {
        self.entries.insert(name.into(), Arc::new(module));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<M> Default for InMemoryRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: ModuleEntity> ModuleRegistry for InMemoryRegistry<M> {
    type Module = M;

    fn snapshot(&self) -> CensusResult<Snapshot<M>> {
        Ok(self
            .entries
            .iter()
            .map(|(name, module)| (name.clone(), Arc::clone(module)))
            .collect())
    }

    fn remove(&mut self, name: &str) -> CensusResult<bool> {
        Ok(self.entries.remove(name).is_some())
    }
}
