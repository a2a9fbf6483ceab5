//! Test data builders
//!
//! Builds `InMemoryProgram`s with named entities. Forward references (loops)
//! reserve a handle first and define it later.

use codegraph_alias::config::AnalysisConfig;
use codegraph_alias::features::offset_alias::{
    CallSite, EntityDescription, EntityId, EntityKind, FunctionId, GepIndex, InMemoryProgram,
    NarrowingSpec, OffsetDomain, Predicate, TypeLayout,
};

/// Builder for InMemoryProgram
pub struct ProgramBuilder {
    program: InMemoryProgram,
    domain: OffsetDomain,
    next: u32,
}

impl ProgramBuilder {
    /// Create a builder whose offsets belong to `domain`
    pub fn new(domain: OffsetDomain) -> Self {
        Self {
            program: InMemoryProgram::new(),
            domain,
            next: 0,
        }
    }

    /// Create a builder matching the offset domain of `config`
    pub fn for_config(config: &AnalysisConfig) -> Self {
        Self::new(config.build_offset_domain())
    }

    pub fn domain(&self) -> &OffsetDomain {
        &self.domain
    }

    /// Hand out a handle to be defined later
    pub fn reserve(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }

    /// Define a reserved handle
    pub fn define(&mut self, id: EntityId, name: &str, kind: EntityKind) -> EntityId {
        self.program.insert(id, EntityDescription::named(kind, name));
        id
    }

    pub fn add(&mut self, name: &str, kind: EntityKind) -> EntityId {
        let id = self.reserve();
        self.define(id, name, kind)
    }

    pub fn stack_alloc(&mut self, name: &str) -> EntityId {
        self.add(name, EntityKind::StackAlloc)
    }

    pub fn global(&mut self, name: &str) -> EntityId {
        self.add(name, EntityKind::Global)
    }

    pub fn load(&mut self, name: &str) -> EntityId {
        self.add(name, EntityKind::Load)
    }

    pub fn argument(&mut self, name: &str, function: FunctionId, index: usize) -> EntityId {
        self.add(
            name,
            EntityKind::Argument {
                function,
                index,
                is_program_arguments: false,
            },
        )
    }

    /// `base + offset`
    pub fn derived(&mut self, name: &str, base: EntityId, offset: i64) -> EntityId {
        let offset = self.domain.constant(offset);
        self.add(name, EntityKind::Derived { base, offset })
    }

    /// Element pointer into an object of type `layout`
    pub fn element(
        &mut self,
        name: &str,
        base: EntityId,
        layout: &TypeLayout,
        indices: &[GepIndex],
    ) -> EntityId {
        let offset = layout.element_offset(indices, &self.domain);
        self.add(name, EntityKind::Derived { base, offset })
    }

    pub fn merge(&mut self, name: &str, incoming: &[EntityId]) -> EntityId {
        self.add(
            name,
            EntityKind::Merge {
                incoming: incoming.to_vec(),
            },
        )
    }

    /// Copy of `source` where `source <predicate> compared` holds
    pub fn restricted(
        &mut self,
        name: &str,
        source: EntityId,
        predicate: Predicate,
        compared: EntityId,
    ) -> EntityId {
        self.add(
            name,
            EntityKind::Restricted {
                source,
                narrowing: NarrowingSpec { predicate, compared },
            },
        )
    }

    pub fn call_site(&mut self, function: FunctionId, arguments: &[EntityId]) {
        self.program
            .add_call_site(function, CallSite::new(arguments.iter().copied().map(Some)));
    }

    pub fn build(self) -> InMemoryProgram {
        self.program
    }
}

/// `p = phi(base, q); q = p + stride`, returning `(p, q)`
pub fn stride_loop(builder: &mut ProgramBuilder, base: EntityId, stride: i64) -> (EntityId, EntityId) {
    let p = builder.reserve();
    let q = builder.reserve();
    builder.define(
        p,
        "p",
        EntityKind::Merge {
            incoming: vec![base, q],
        },
    );
    let offset = builder.domain().constant(stride);
    builder.define(q, "q", EntityKind::Derived { base: p, offset });
    (p, q)
}
