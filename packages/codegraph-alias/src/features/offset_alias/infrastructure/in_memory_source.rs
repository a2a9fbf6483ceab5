//! In-memory program description
//!
//! An [`EntitySource`] backed by plain maps. Used by front ends that already
//! hold their entities in memory, and by the tests and benchmarks.
//!
//! ```text
//! let mut program = InMemoryProgram::new();
//! let buf = program.add(EntityKind::StackAlloc);
//! let p   = program.add(EntityKind::Derived { base: buf, offset });
//! ```

use crate::features::offset_alias::domain::{
    CallSite, EntityDescription, EntityId, EntityKind, FunctionId,
};
use crate::features::offset_alias::ports::EntitySource;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub struct InMemoryProgram {
    entities: BTreeMap<EntityId, EntityDescription>,
    call_sites: FxHashMap<FunctionId, Vec<CallSite>>,
    next_id: u32,
}

impl InMemoryProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an unnamed entity under the next free handle
    pub fn add(&mut self, kind: EntityKind) -> EntityId {
        self.add_named(EntityDescription::new(kind))
    }

    /// Register a described entity under the next free handle
    pub fn add_named(&mut self, description: EntityDescription) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, description);
        id
    }

    /// Register (or replace) an entity under a chosen handle
    pub fn insert(&mut self, id: EntityId, description: EntityDescription) {
        self.next_id = self.next_id.max(id.0 + 1);
        self.entities.insert(id, description);
    }

    pub fn add_call_site(&mut self, function: FunctionId, site: CallSite) {
        self.call_sites.entry(function).or_default().push(site);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl EntitySource for InMemoryProgram {
    fn entities(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    fn describe(&self, entity: EntityId) -> Option<EntityDescription> {
        self.entities.get(&entity).cloned()
    }

    fn call_sites(&self, function: FunctionId) -> Vec<CallSite> {
        self.call_sites.get(&function).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_are_sequential() {
        let mut program = InMemoryProgram::new();
        let a = program.add(EntityKind::StackAlloc);
        let b = program.add(EntityKind::Cast { source: a });
        assert_eq!(a, EntityId(0));
        assert_eq!(b, EntityId(1));

        program.insert(EntityId(10), EntityDescription::new(EntityKind::Null));
        assert_eq!(program.add(EntityKind::Load), EntityId(11));
        assert_eq!(program.len(), 4);
    }

    #[test]
    fn test_call_sites_by_function() {
        let mut program = InMemoryProgram::new();
        let a = program.add(EntityKind::StackAlloc);
        program.add_call_site(FunctionId(1), CallSite::new([Some(a)]));
        program.add_call_site(FunctionId(1), CallSite::new([None]));

        assert_eq!(program.call_sites(FunctionId(1)).len(), 2);
        assert!(program.call_sites(FunctionId(2)).is_empty());
    }
}
