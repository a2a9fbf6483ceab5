//! Symbolic Offsets
//!
//! An offset is the displacement of a pointer from one of its bases. The
//! analysis never commits to a numeric domain: an [`Offset`] is a bundle of
//! pluggable [`OffsetRepresentation`]s, each answering the four questions the
//! resolution engine needs (add, disjoint, narrow, widen).
//!
//! # Combining representations
//! ```text
//! offset = (interval [0, 16] & congruence 0 mod 8)
//!
//! disjoint(a, b) = ∃ rep. rep_a ∩ rep_b = ∅
//! ```
//! One representation ruling out an overlap is enough, so disjointness is the
//! OR over representations. Everything else is pointwise.

use super::narrowing::{Predicate, WideningOp};
use crate::errors::{AliasError, Result};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier a representation registers under
pub type RepresentationId = u32;

/// A numeric backend for offsets.
///
/// Implementations are value objects: every operation returns a fresh boxed
/// instance and never mutates `self`. Operands are always instances of the same
/// representation; use [`downcast_operand`] to recover the concrete type.
pub trait OffsetRepresentation: fmt::Debug + fmt::Display + Send + Sync {
    /// Identifier shared by every instance of this representation
    fn id(&self) -> RepresentationId;

    /// Short name used in reports
    fn name(&self) -> &'static str;

    /// Deep copy
    fn clone_box(&self) -> Box<dyn OffsetRepresentation>;

    /// Downcasting support
    fn as_any(&self) -> &dyn Any;

    /// The neutral element (zero displacement) of this representation
    fn neutral(&self) -> Box<dyn OffsetRepresentation>;

    /// Best approximation of the byte range `[lower, upper]`
    fn from_bounds(&self, lower: i64, upper: i64) -> Box<dyn OffsetRepresentation>;

    /// Offset composition: `self + other`
    fn add(&self, other: &dyn OffsetRepresentation) -> Result<Box<dyn OffsetRepresentation>>;

    /// True if the two offsets can never denote the same displacement
    fn disjoint(&self, other: &dyn OffsetRepresentation) -> Result<bool>;

    /// Restrict `self` knowing that `self <predicate> other` holds
    fn narrow(
        &self,
        predicate: Predicate,
        other: &dyn OffsetRepresentation,
    ) -> Result<Box<dyn OffsetRepresentation>>;

    /// Jump to a safe over-approximation in the direction `before → after` grew
    fn widen(
        &self,
        before: &dyn OffsetRepresentation,
        after: &dyn OffsetRepresentation,
    ) -> Result<Box<dyn OffsetRepresentation>>;

    /// Structural equality (used to de-duplicate edges, never for aliasing)
    fn same_as(&self, other: &dyn OffsetRepresentation) -> bool;

    /// True for the neutral element
    fn is_neutral(&self) -> bool;

    /// True if the offset denotes no displacement at all
    fn is_empty(&self) -> bool {
        false
    }
}

/// Recover the concrete representation of an operand.
///
/// Fails with [`AliasError::ForeignRepresentation`] if `other` belongs to a
/// different representation than `expected`.
pub fn downcast_operand<'a, T: 'static>(
    expected: RepresentationId,
    other: &'a dyn OffsetRepresentation,
) -> Result<&'a T> {
    other
        .as_any()
        .downcast_ref::<T>()
        .ok_or(AliasError::ForeignRepresentation {
            expected,
            found: other.id(),
        })
}

/// A symbolic displacement: one instance per registered representation
#[derive(Default)]
pub struct Offset {
    reps: BTreeMap<RepresentationId, Box<dyn OffsetRepresentation>>,
}

impl Clone for Offset {
    fn clone(&self) -> Self {
        Self {
            reps: self
                .reps
                .iter()
                .map(|(&id, rep)| (id, rep.clone_box()))
                .collect(),
        }
    }
}

impl Offset {
    /// An offset without representations (only useful as a placeholder)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a list of representation instances
    pub fn from_representations(
        reps: impl IntoIterator<Item = Box<dyn OffsetRepresentation>>,
    ) -> Self {
        Self {
            reps: reps.into_iter().map(|rep| (rep.id(), rep)).collect(),
        }
    }

    /// Add (or replace) one representation
    pub fn with(mut self, rep: Box<dyn OffsetRepresentation>) -> Self {
        self.reps.insert(rep.id(), rep);
        self
    }

    /// Representation ids carried by this offset, sorted
    pub fn representation_ids(&self) -> Vec<RepresentationId> {
        self.reps.keys().copied().collect()
    }

    /// Number of representations
    #[inline]
    pub fn len(&self) -> usize {
        self.reps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.reps.is_empty()
    }

    /// Access one representation by id
    pub fn get(&self, id: RepresentationId) -> Option<&dyn OffsetRepresentation> {
        self.reps.get(&id).map(|rep| rep.as_ref())
    }

    /// Access one representation by concrete type
    pub fn representation<T: 'static>(&self) -> Option<&T> {
        self.reps
            .values()
            .find_map(|rep| rep.as_any().downcast_ref::<T>())
    }

    /// Iterate over representations in id order
    pub fn iter(&self) -> impl Iterator<Item = &dyn OffsetRepresentation> + '_ {
        self.reps.values().map(|rep| rep.as_ref())
    }

    fn check_compatible(&self, other: &Offset) -> Result<()> {
        if self.reps.len() != other.reps.len()
            || self.reps.keys().zip(other.reps.keys()).any(|(a, b)| a != b)
        {
            return Err(AliasError::RepresentationMismatch {
                left: self.representation_ids(),
                right: other.representation_ids(),
            });
        }
        Ok(())
    }

    /// Pointwise addition
    pub fn add(&self, other: &Offset) -> Result<Offset> {
        self.check_compatible(other)?;
        let mut reps = BTreeMap::new();
        for (id, rep) in &self.reps {
            reps.insert(*id, rep.add(other.reps[id].as_ref())?);
        }
        Ok(Offset { reps })
    }

    /// True iff any representation proves the offsets disjoint
    pub fn disjoint(&self, other: &Offset) -> Result<bool> {
        self.check_compatible(other)?;
        for (id, rep) in &self.reps {
            if rep.disjoint(other.reps[id].as_ref())? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Equality-as-non-disjointness. Mismatched offsets are assumed to overlap.
    pub fn may_overlap(&self, other: &Offset) -> bool {
        !self.disjoint(other).unwrap_or(false)
    }

    /// Narrow every representation knowing `self <predicate> bound`
    pub fn narrow_against(&self, predicate: Predicate, bound: &Offset) -> Result<Offset> {
        self.check_compatible(bound)?;
        let mut reps = BTreeMap::new();
        for (id, rep) in &self.reps {
            reps.insert(*id, rep.narrow(predicate, bound.reps[id].as_ref())?);
        }
        Ok(Offset { reps })
    }

    /// Pointwise widening driven by the growth recorded in `op`
    pub fn widen(&self, op: &WideningOp) -> Result<Offset> {
        self.check_compatible(&op.before)?;
        self.check_compatible(&op.after)?;
        let mut reps = BTreeMap::new();
        for (id, rep) in &self.reps {
            reps.insert(
                *id,
                rep.widen(op.before.reps[id].as_ref(), op.after.reps[id].as_ref())?,
            );
        }
        Ok(Offset { reps })
    }

    /// Structural equality
    pub fn same_as(&self, other: &Offset) -> bool {
        self.check_compatible(other).is_ok()
            && self
                .reps
                .iter()
                .all(|(id, rep)| rep.same_as(other.reps[id].as_ref()))
    }

    /// True if every representation is neutral
    pub fn is_neutral(&self) -> bool {
        self.reps.values().all(|rep| rep.is_neutral())
    }

    /// True if some representation denotes no displacement at all
    pub fn denotes_nothing(&self) -> bool {
        self.reps.values().any(|rep| rep.is_empty())
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, rep) in self.reps.values().enumerate() {
            if i > 0 {
                write!(f, " & ")?;
            }
            write!(f, "{}", rep)?;
        }
        write!(f, ")")
    }
}

impl fmt::Debug for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Offset{}", self)
    }
}

/// The set of representations an analysis run works with.
///
/// Every offset the engine manufactures (neutral offsets for seeding and self
/// addresses) comes from here, so all offsets in one graph carry the same ids.
#[derive(Debug, Clone)]
pub struct OffsetDomain {
    neutral: Offset,
}

impl OffsetDomain {
    /// Register representations by prototype instance
    pub fn new(prototypes: impl IntoIterator<Item = Box<dyn OffsetRepresentation>>) -> Self {
        Self {
            neutral: Offset::from_representations(prototypes.into_iter().map(|p| p.neutral())),
        }
    }

    /// Neutral (zero) offset
    #[inline]
    pub fn neutral(&self) -> Offset {
        self.neutral.clone()
    }

    /// Constant displacement of `value` bytes
    pub fn constant(&self, value: i64) -> Offset {
        self.range(value, value)
    }

    /// Displacement somewhere in `[lower, upper]`
    pub fn range(&self, lower: i64, upper: i64) -> Offset {
        Offset::from_representations(self.neutral.iter().map(|rep| rep.from_bounds(lower, upper)))
    }

    /// Representation ids of this domain
    pub fn representation_ids(&self) -> Vec<RepresentationId> {
        self.neutral.representation_ids()
    }
}
