//! Interval Offsets
//!
//! Byte displacements as closed integer intervals `[min, max]`.
//!
//! ## Infinities
//!
//! `i64::MIN` and `i64::MAX` stand for −∞ and +∞ and are sticky under
//! addition, so `[0, +∞) + 8 = [8, +∞)` rather than an overflowed bound.
//!
//! ## Example
//!
//! ```text
//! p = phi(a, p + 8)   ← (p → a, [0, 0]) ... widened by [0,0] → [8,8]
//!                     ← (p → a, [0, +∞))
//! if (p < end):       ← narrowed against end's offset from a
//! ```

use crate::errors::Result;
use crate::features::offset_alias::domain::narrowing::Predicate;
use crate::features::offset_alias::domain::offset::{
    downcast_operand, OffsetDomain, OffsetRepresentation, RepresentationId,
};
use std::any::Any;
use std::fmt;

/// Registration id of the interval representation
pub const INTERVAL_REPRESENTATION: RepresentationId = 1;

const NEG_INF: i64 = i64::MIN;
const POS_INF: i64 = i64::MAX;

/// Integer range: [min, max]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Singleton range
    pub fn constant(value: i64) -> Self {
        Self::new(value, value)
    }

    /// (−∞, +∞)
    pub fn unbounded() -> Self {
        Self::new(NEG_INF, POS_INF)
    }

    /// Canonical empty range
    pub fn empty() -> Self {
        Self::new(1, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    pub fn is_constant(&self) -> bool {
        self.min == self.max
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn intersect(&self, other: &IntRange) -> IntRange {
        IntRange::new(self.min.max(other.min), self.max.min(other.max))
    }

    /// Smallest range containing both
    pub fn union(&self, other: &IntRange) -> IntRange {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        IntRange::new(self.min.min(other.min), self.max.max(other.max))
    }

    /// Interval addition with sticky infinities
    pub fn add(&self, other: &IntRange) -> IntRange {
        if self.is_empty() || other.is_empty() {
            return IntRange::empty();
        }
        let min = if self.min == NEG_INF || other.min == NEG_INF {
            NEG_INF
        } else {
            self.min.saturating_add(other.min)
        };
        let max = if self.max == POS_INF || other.max == POS_INF {
            POS_INF
        } else {
            self.max.saturating_add(other.max)
        };
        IntRange::new(min, max)
    }

    /// Restrict knowing `self <op> other` holds for some value of `other`
    pub fn apply_comparison(&self, op: Predicate, other: &IntRange) -> IntRange {
        if other.is_empty() {
            return *self;
        }
        match op {
            Predicate::Lt if other.max != POS_INF => {
                self.intersect(&IntRange::new(NEG_INF, other.max.saturating_sub(1)))
            }
            Predicate::Le => self.intersect(&IntRange::new(NEG_INF, other.max)),
            Predicate::Gt if other.min != NEG_INF => {
                self.intersect(&IntRange::new(other.min.saturating_add(1), POS_INF))
            }
            Predicate::Ge => self.intersect(&IntRange::new(other.min, POS_INF)),
            Predicate::Eq => self.intersect(other),
            Predicate::Ne if other.is_constant() => {
                let value = other.min;
                if self.is_constant() && self.min == value {
                    IntRange::empty()
                } else if self.min == value {
                    IntRange::new(value.saturating_add(1), self.max)
                } else if self.max == value {
                    IntRange::new(self.min, value.saturating_sub(1))
                } else {
                    *self
                }
            }
            _ => *self,
        }
    }

    /// Open every bound that moved between `before` and `after`
    pub fn widen(&self, before: &IntRange, after: &IntRange) -> IntRange {
        if self.is_empty() || before.is_empty() || after.is_empty() {
            return *self;
        }
        let min = if after.min < before.min { NEG_INF } else { self.min };
        let max = if after.max > before.max { POS_INF } else { self.max };
        IntRange::new(min, max)
    }
}

impl fmt::Display for IntRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "∅");
        }
        if self.is_constant() {
            return write!(f, "{}", self.min);
        }
        match self.min {
            NEG_INF => write!(f, "(-inf, ")?,
            min => write!(f, "[{}, ", min)?,
        }
        match self.max {
            POS_INF => write!(f, "+inf)"),
            max => write!(f, "{}]", max),
        }
    }
}

/// Interval representation of an offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntervalOffset {
    range: IntRange,
}

impl IntervalOffset {
    pub fn new(range: IntRange) -> Self {
        Self { range }
    }

    #[inline]
    pub fn range(&self) -> IntRange {
        self.range
    }

    /// Offset domain carrying intervals only
    pub fn domain() -> OffsetDomain {
        OffsetDomain::new([Box::new(Self::new(IntRange::constant(0))) as Box<dyn OffsetRepresentation>])
    }

    fn operand(other: &dyn OffsetRepresentation) -> Result<&Self> {
        downcast_operand::<Self>(INTERVAL_REPRESENTATION, other)
    }
}

impl fmt::Display for IntervalOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.range)
    }
}

impl OffsetRepresentation for IntervalOffset {
    fn id(&self) -> RepresentationId {
        INTERVAL_REPRESENTATION
    }

    fn name(&self) -> &'static str {
        "interval"
    }

    fn clone_box(&self) -> Box<dyn OffsetRepresentation> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn neutral(&self) -> Box<dyn OffsetRepresentation> {
        Box::new(Self::new(IntRange::constant(0)))
    }

    fn from_bounds(&self, lower: i64, upper: i64) -> Box<dyn OffsetRepresentation> {
        Box::new(Self::new(IntRange::new(lower, upper)))
    }

    fn add(&self, other: &dyn OffsetRepresentation) -> Result<Box<dyn OffsetRepresentation>> {
        let other = Self::operand(other)?;
        Ok(Box::new(Self::new(self.range.add(&other.range))))
    }

    fn disjoint(&self, other: &dyn OffsetRepresentation) -> Result<bool> {
        let other = Self::operand(other)?;
        Ok(self.range.intersect(&other.range).is_empty())
    }

    fn narrow(
        &self,
        predicate: Predicate,
        other: &dyn OffsetRepresentation,
    ) -> Result<Box<dyn OffsetRepresentation>> {
        let other = Self::operand(other)?;
        Ok(Box::new(Self::new(
            self.range.apply_comparison(predicate, &other.range),
        )))
    }

    fn widen(
        &self,
        before: &dyn OffsetRepresentation,
        after: &dyn OffsetRepresentation,
    ) -> Result<Box<dyn OffsetRepresentation>> {
        let before = Self::operand(before)?;
        let after = Self::operand(after)?;
        Ok(Box::new(Self::new(
            self.range.widen(&before.range, &after.range),
        )))
    }

    fn same_as(&self, other: &dyn OffsetRepresentation) -> bool {
        Self::operand(other)
            .map(|other| other.range == self.range)
            .unwrap_or(false)
    }

    fn is_neutral(&self) -> bool {
        self.range == IntRange::constant(0)
    }

    fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}
