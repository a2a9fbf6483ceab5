//! Domain model: offsets, operators, nodes, edges and the graph arena

pub mod address;
pub mod entity;
pub mod narrowing;
pub mod offset;
pub mod pointer_graph;
pub mod pointer_node;
pub mod verdict;

pub use address::{Address, AddressDraft, AddressId, ExpandOutcome, ExpandedMap};
pub use entity::{CallSite, EntityDescription, EntityId, EntityKind, FunctionId, NarrowingSpec};
pub use narrowing::{NarrowingOp, NarrowingOps, Predicate, WideningOp, WideningOps};
pub use offset::{Offset, OffsetDomain, OffsetRepresentation, RepresentationId};
pub use pointer_graph::{GraphCounters, PointerGraph};
pub use pointer_node::{LocalTree, NodeId, PointerKind, PointerNode};
pub use verdict::{AliasResult, AliasVerdict, DecidedBy};
