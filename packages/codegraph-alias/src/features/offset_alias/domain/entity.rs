//! Program Entities
//!
//! The analysis does not walk an IR. A collaborator describes each
//! pointer-valued program entity with a closed [`EntityKind`] and the core
//! classifies it by exhaustive matching.
//!
//! # Example
//! ```text
//! %buf  = alloca [16 x i32]          → StackAlloc
//! %p    = gep %buf, 0, 4             → Derived { base: %buf, offset: 16 }
//! %q    = phi [%p, %a], [%buf, %b]   → Merge { incoming: [%p, %buf] }
//! %r    = bitcast %q                 → Cast { source: %q }
//! ```

use super::narrowing::Predicate;
use super::offset::Offset;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle of a program entity, owned by the collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Opaque handle of a function, used to find the call sites of an argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FunctionId(pub u32);

/// A call of some function; `None` marks an actual argument that is not a pointer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallSite {
    pub arguments: Vec<Option<EntityId>>,
}

impl CallSite {
    pub fn new(arguments: impl IntoIterator<Item = Option<EntityId>>) -> Self {
        Self {
            arguments: arguments.into_iter().collect(),
        }
    }
}

/// A comparison already attached to a branch-restricted copy of a pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrowingSpec {
    pub predicate: Predicate,
    pub compared: EntityId,
}

/// Closed classification of pointer-valued entities
#[derive(Debug, Clone)]
pub enum EntityKind {
    /// Global variable
    Global,
    /// Function address
    Function,
    /// Stack allocation
    StackAlloc,
    /// Result of a call; `allocates` when the callee is known to return fresh memory
    Call { allocates: bool },
    /// Formal parameter `index` of `function`
    Argument {
        function: FunctionId,
        index: usize,
        /// The program argument vector (`argv`) is its own allocation
        is_program_arguments: bool,
    },
    /// Same address, different type
    Cast { source: EntityId },
    /// Element/field pointer: `base + offset`
    Derived { base: EntityId, offset: Offset },
    /// Merge of several alternatives (phi, select)
    Merge { incoming: Vec<EntityId> },
    /// Copy of `source` on a branch where `narrowing` holds
    Restricted {
        source: EntityId,
        narrowing: NarrowingSpec,
    },
    /// Pointer loaded from memory
    Load,
    /// Null constant
    Null,
    /// Anything the collaborator cannot describe
    Opaque,
}

impl EntityKind {
    /// Short tag used in logs and reports
    pub fn tag(&self) -> &'static str {
        match self {
            EntityKind::Global => "global",
            EntityKind::Function => "function",
            EntityKind::StackAlloc => "stack-alloc",
            EntityKind::Call { .. } => "call",
            EntityKind::Argument { .. } => "argument",
            EntityKind::Cast { .. } => "cast",
            EntityKind::Derived { .. } => "derived",
            EntityKind::Merge { .. } => "merge",
            EntityKind::Restricted { .. } => "restricted",
            EntityKind::Load => "load",
            EntityKind::Null => "null",
            EntityKind::Opaque => "opaque",
        }
    }

    /// Entities whose addresses carry argument provenance
    #[inline]
    pub fn is_argument(&self) -> bool {
        matches!(self, EntityKind::Argument { .. })
    }

    /// Entities whose addresses carry global provenance
    #[inline]
    pub fn is_global(&self) -> bool {
        matches!(self, EntityKind::Global | EntityKind::Function)
    }
}

/// Everything the collaborator knows about one entity
#[derive(Debug, Clone)]
pub struct EntityDescription {
    pub kind: EntityKind,
    pub name: Option<String>,
}

impl EntityDescription {
    pub fn new(kind: EntityKind) -> Self {
        Self { kind, name: None }
    }

    pub fn named(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: Some(name.into()),
        }
    }
}

impl From<EntityKind> for EntityDescription {
    fn from(kind: EntityKind) -> Self {
        Self::new(kind)
    }
}
