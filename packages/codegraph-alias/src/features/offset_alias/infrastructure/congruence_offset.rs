//! Congruence Offsets
//!
//! Tracks `offset ≡ c (mod k)`. Canonical form: `0 <= c < k`; `k = 0` means
//! the constant `c`; `k = 1` means any displacement.
//!
//! Intervals lose everything once a loop is widened; the stride survives:
//!
//! ```text
//! p = phi(a, p + 8)    ← interval [0, +inf)   congruence 0 mod 8
//! q = a + 4            ← interval 4           congruence 4 (mod 0)
//!                        intervals overlap, 4 ≢ 0 (mod 8) ⇒ disjoint
//! ```

use crate::errors::Result;
use crate::features::offset_alias::domain::narrowing::Predicate;
use crate::features::offset_alias::domain::offset::{
    downcast_operand, OffsetDomain, OffsetRepresentation, RepresentationId,
};
use crate::features::offset_alias::infrastructure::interval_offset::{IntRange, IntervalOffset};
use num_integer::Integer;
use std::any::Any;
use std::fmt;

/// Registration id of the congruence representation
pub const CONGRUENCE_REPRESENTATION: RepresentationId = 2;

/// x ≡ remainder (mod modulus)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CongruenceOffset {
    remainder: i64,
    modulus: i64,
}

impl CongruenceOffset {
    pub fn constant(value: i64) -> Self {
        Self {
            remainder: value,
            modulus: 0,
        }
    }

    /// Any displacement
    pub fn top() -> Self {
        Self {
            remainder: 0,
            modulus: 1,
        }
    }

    pub fn new(remainder: i64, modulus: i64) -> Self {
        if modulus == 0 {
            return Self::constant(remainder);
        }
        let modulus = modulus.checked_abs().unwrap_or(1);
        if modulus == 1 {
            return Self::top();
        }
        Self {
            remainder: remainder.rem_euclid(modulus),
            modulus,
        }
    }

    #[inline]
    pub fn remainder(&self) -> i64 {
        self.remainder
    }

    #[inline]
    pub fn modulus(&self) -> i64 {
        self.modulus
    }

    pub fn is_top(&self) -> bool {
        self.modulus == 1
    }

    /// Offset domain carrying intervals and congruences
    pub fn domain_with_intervals() -> OffsetDomain {
        OffsetDomain::new([
            Box::new(IntervalOffset::new(IntRange::constant(0))) as Box<dyn OffsetRepresentation>,
            Box::new(Self::constant(0)),
        ])
    }

    fn operand(other: &dyn OffsetRepresentation) -> Result<&Self> {
        downcast_operand::<Self>(CONGRUENCE_REPRESENTATION, other)
    }

    /// Congruence of the difference `self - other`
    fn difference(&self, other: &Self) -> Self {
        match self.remainder.checked_sub(other.remainder) {
            Some(diff) => Self::new(diff, self.modulus.gcd(&other.modulus)),
            None => Self::top(),
        }
    }
}

impl fmt::Display for CongruenceOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modulus {
            0 => write!(f, "={}", self.remainder),
            1 => write!(f, "⊤"),
            k => write!(f, "{} mod {}", self.remainder, k),
        }
    }
}

impl OffsetRepresentation for CongruenceOffset {
    fn id(&self) -> RepresentationId {
        CONGRUENCE_REPRESENTATION
    }

    fn name(&self) -> &'static str {
        "congruence"
    }

    fn clone_box(&self) -> Box<dyn OffsetRepresentation> {
        Box::new(*self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn neutral(&self) -> Box<dyn OffsetRepresentation> {
        Box::new(Self::constant(0))
    }

    fn from_bounds(&self, lower: i64, upper: i64) -> Box<dyn OffsetRepresentation> {
        if lower == upper {
            Box::new(Self::constant(lower))
        } else {
            Box::new(Self::top())
        }
    }

    fn add(&self, other: &dyn OffsetRepresentation) -> Result<Box<dyn OffsetRepresentation>> {
        let other = Self::operand(other)?;
        let result = match self.remainder.checked_add(other.remainder) {
            Some(sum) => Self::new(sum, self.modulus.gcd(&other.modulus)),
            None => Self::top(),
        };
        Ok(Box::new(result))
    }

    fn disjoint(&self, other: &dyn OffsetRepresentation) -> Result<bool> {
        let other = Self::operand(other)?;
        // Solutions to x ≡ c1 (k1), x ≡ c2 (k2) exist iff gcd(k1, k2) | (c1 - c2)
        Ok(self.difference(other).remainder != 0)
    }

    fn narrow(
        &self,
        predicate: Predicate,
        other: &dyn OffsetRepresentation,
    ) -> Result<Box<dyn OffsetRepresentation>> {
        let other = Self::operand(other)?;
        // Only equality against a constant carries modular information
        let narrowed = match predicate {
            Predicate::Eq if other.modulus == 0 && !self.disjoint(other)? => *other,
            _ => *self,
        };
        Ok(Box::new(narrowed))
    }

    fn widen(
        &self,
        before: &dyn OffsetRepresentation,
        after: &dyn OffsetRepresentation,
    ) -> Result<Box<dyn OffsetRepresentation>> {
        let before = Self::operand(before)?;
        let after = Self::operand(after)?;
        // self + n·(after - before) for every n ≥ 0
        let step = after.difference(before);
        let modulus = self
            .modulus
            .gcd(&step.modulus)
            .gcd(&step.remainder.checked_abs().unwrap_or(1));
        Ok(Box::new(Self::new(self.remainder, modulus)))
    }

    fn same_as(&self, other: &dyn OffsetRepresentation) -> bool {
        Self::operand(other)
            .map(|other| other == self)
            .unwrap_or(false)
    }

    fn is_neutral(&self) -> bool {
        *self == Self::constant(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::offset_alias::domain::narrowing::WideningOp;

    #[test]
    fn test_canonical_form() {
        assert_eq!(CongruenceOffset::new(-3, 8), CongruenceOffset::new(5, 8));
        assert!(CongruenceOffset::new(7, 1).is_top());
        assert_eq!(CongruenceOffset::new(4, 0), CongruenceOffset::constant(4));
    }

    #[test]
    fn test_add_takes_gcd() {
        let a = CongruenceOffset::new(0, 8);
        let b = CongruenceOffset::new(2, 12);
        let sum = a.add(&b).unwrap();
        assert!(sum.same_as(&CongruenceOffset::new(2, 4)));

        let c = CongruenceOffset::constant(4);
        assert!(a.add(&c).unwrap().same_as(&CongruenceOffset::new(4, 8)));
    }

    #[test]
    fn test_disjoint_by_stride() {
        let stride = CongruenceOffset::new(0, 8);
        assert!(stride.disjoint(&CongruenceOffset::constant(4)).unwrap());
        assert!(!stride.disjoint(&CongruenceOffset::constant(16)).unwrap());
        assert!(!stride.disjoint(&CongruenceOffset::top()).unwrap());
        assert!(CongruenceOffset::new(1, 2)
            .disjoint(&CongruenceOffset::new(0, 4))
            .unwrap());
        assert!(CongruenceOffset::constant(3)
            .disjoint(&CongruenceOffset::constant(5))
            .unwrap());
    }

    #[test]
    fn test_widen_records_step() {
        let start = CongruenceOffset::constant(0);
        let widened = start
            .widen(&CongruenceOffset::constant(0), &CongruenceOffset::constant(8))
            .unwrap();
        assert!(widened.same_as(&CongruenceOffset::new(0, 8)));

        // No growth, no change
        let same = CongruenceOffset::constant(4)
            .widen(&CongruenceOffset::constant(2), &CongruenceOffset::constant(2))
            .unwrap();
        assert!(same.same_as(&CongruenceOffset::constant(4)));
    }

    #[test]
    fn test_combined_domain_separates_strided_loop() {
        let domain = CongruenceOffset::domain_with_intervals();
        let op = WideningOp::new(domain.neutral(), domain.constant(8));
        let walker = domain.neutral().widen(&op).unwrap();

        assert!(walker.disjoint(&domain.constant(4)).unwrap());
        assert!(!walker.disjoint(&domain.constant(24)).unwrap());
        assert!(walker.disjoint(&domain.constant(-8)).unwrap());
    }
}
