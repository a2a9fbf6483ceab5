//! Reference materializer
//!
//! Classifies the closed [`EntityKind`] of every entity and creates its
//! initial addresses.
//!
//! | entity                         | kind       | initial addresses           |
//! |--------------------------------|------------|-----------------------------|
//! | global, function               | Global     | -                           |
//! | stack allocation               | Alloc      | -                           |
//! | allocating call                | Alloc      | -                           |
//! | other call                     | Call       | -                           |
//! | program argument vector        | Alloc      | -                           |
//! | argument (intraprocedural)     | Argument   | -                           |
//! | argument (interprocedural)     | Phi        | (actual, 0) per call site   |
//! | cast                           | Continuous | (source, 0)                 |
//! | derived                        | Continuous | (base, offset)              |
//! | merge                          | Phi        | (incoming, 0) each          |
//! | restricted                     | Continuous | (source, 0) + narrowing     |
//! | load, opaque                   | Unknown    | -                           |
//! | null                           | Null       | -                           |

use crate::errors::Result;
use crate::features::offset_alias::domain::{EntityId, EntityKind, FunctionId, NodeId, PointerKind};
use crate::features::offset_alias::ports::{
    AddressMaterializer, Classification, EntitySource, GraphAccessor,
};
use tracing::trace;

pub struct EntityClassifier<S> {
    source: S,
    interprocedural: bool,
}

impl<S: EntitySource> EntityClassifier<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            interprocedural: false,
        }
    }

    /// Resolve arguments through their call sites right away
    pub fn with_interprocedural(mut self, enabled: bool) -> Self {
        self.interprocedural = enabled;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// One `(actual, 0)` address per call site.
    ///
    /// Nothing is created unless every call site passes a pointer in position
    /// `index`; otherwise the argument is unknown.
    fn link_call_sites(
        &self,
        node: NodeId,
        function: FunctionId,
        index: usize,
        graph: &mut dyn GraphAccessor,
    ) -> Result<(PointerKind, usize)> {
        let mut actuals = Vec::new();
        let mut insufficient = 0;
        let mut opaque = false;
        for site in self.source.call_sites(function) {
            match site.arguments.get(index) {
                Some(Some(actual)) => actuals.push(*actual),
                Some(None) => opaque = true,
                None => insufficient += 1,
            }
        }

        if insufficient > 0 || opaque {
            return Ok((PointerKind::Unknown, insufficient));
        }
        for actual in actuals {
            let base = graph.get_or_create_node(actual);
            let neutral = graph.domain().neutral();
            graph.create_address(base, node, neutral)?;
        }
        Ok((PointerKind::Phi, 0))
    }
}

impl<S: EntitySource> AddressMaterializer for EntityClassifier<S> {
    fn materialize(
        &mut self,
        node: NodeId,
        entity: EntityId,
        graph: &mut dyn GraphAccessor,
    ) -> Result<Classification> {
        let Some(description) = self.source.describe(entity) else {
            trace!(%entity, "entity not described; unknown");
            return Ok(Classification::of_kind(PointerKind::Unknown));
        };

        let mut classification = Classification {
            kind: PointerKind::Unknown,
            name: description.name,
            entity_is_argument: description.kind.is_argument(),
            entity_is_global: description.kind.is_global(),
            insufficient_call_sites: 0,
        };

        classification.kind = match description.kind {
            EntityKind::Global | EntityKind::Function => PointerKind::Global,
            EntityKind::StackAlloc => PointerKind::Alloc,
            EntityKind::Call { allocates: true } => PointerKind::Alloc,
            EntityKind::Call { allocates: false } => PointerKind::Call,
            EntityKind::Argument {
                is_program_arguments: true,
                ..
            } => PointerKind::Alloc,
            EntityKind::Argument {
                function, index, ..
            } => {
                if self.interprocedural {
                    let (kind, insufficient) = self.link_call_sites(node, function, index, graph)?;
                    classification.insufficient_call_sites = insufficient;
                    kind
                } else {
                    PointerKind::Argument
                }
            }
            EntityKind::Cast { source } => {
                let base = graph.get_or_create_node(source);
                let neutral = graph.domain().neutral();
                graph.create_address(base, node, neutral)?;
                PointerKind::Continuous
            }
            EntityKind::Derived { base, offset } => {
                let base = graph.get_or_create_node(base);
                graph.create_address(base, node, offset)?;
                PointerKind::Continuous
            }
            EntityKind::Merge { incoming } => {
                for value in incoming {
                    let base = graph.get_or_create_node(value);
                    let neutral = graph.domain().neutral();
                    graph.create_address(base, node, neutral)?;
                }
                PointerKind::Phi
            }
            EntityKind::Restricted { source, narrowing } => {
                let base = graph.get_or_create_node(source);
                let neutral = graph.domain().neutral();
                let address = graph.create_address(base, node, neutral)?;
                let op = graph.derive_narrowing_op(narrowing.predicate, narrowing.compared);
                graph.attach_narrowing(address, op)?;
                PointerKind::Continuous
            }
            EntityKind::Load | EntityKind::Opaque => PointerKind::Unknown,
            EntityKind::Null => PointerKind::Null,
        };

        trace!(%entity, %node, kind = %classification.kind, "classified");
        Ok(classification)
    }

    fn materialize_call_sites(
        &mut self,
        node: NodeId,
        entity: EntityId,
        graph: &mut dyn GraphAccessor,
    ) -> Result<Option<Classification>> {
        let Some(description) = self.source.describe(entity) else {
            return Ok(None);
        };
        let EntityKind::Argument {
            function,
            index,
            is_program_arguments: false,
        } = description.kind
        else {
            return Ok(None);
        };

        let (kind, insufficient) = self.link_call_sites(node, function, index, graph)?;
        Ok(Some(Classification {
            kind,
            name: description.name,
            entity_is_argument: true,
            entity_is_global: false,
            insufficient_call_sites: insufficient,
        }))
    }
}
