//! Error types for codegraph-alias
//!
//! Provides unified error handling across the crate.

use crate::config::ConfigError;
use crate::features::offset_alias::domain::address::AddressId;
use crate::features::offset_alias::domain::offset::RepresentationId;
use crate::features::offset_alias::domain::pointer_node::NodeId;
use thiserror::Error;

/// Main error type for alias analysis operations
#[derive(Debug, Error)]
pub enum AliasError {
    /// Two offsets that interact carry different representation sets.
    /// This is a wiring error in the collaborator and aborts the run.
    #[error("Offset representation mismatch: {left:?} vs {right:?}")]
    RepresentationMismatch {
        left: Vec<RepresentationId>,
        right: Vec<RepresentationId>,
    },

    /// A representation was handed an instance of another representation
    #[error("Representation {expected} received an operand of representation {found}")]
    ForeignRepresentation {
        expected: RepresentationId,
        found: RepresentationId,
    },

    /// An address handle outlived the edge it referred to
    #[error("Stale address handle {0}")]
    StaleAddress(AddressId),

    /// A node handle that does not belong to this graph
    #[error("Unknown pointer node {0}")]
    UnknownNode(NodeId),

    /// Graph invariant violation
    #[error("Malformed graph: {0}")]
    MalformedGraph(String),

    /// Report serialization error
    #[error("Report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AliasError {
    /// Create a malformed graph error
    pub fn malformed(msg: impl Into<String>) -> Self {
        AliasError::MalformedGraph(msg.into())
    }
}

/// Result type alias for alias analysis operations
pub type Result<T> = std::result::Result<T, AliasError>;
