//! Primitive Layouts
//!
//! Aggregate types flattened into sequences of primitive sizes, used to turn
//! element-pointer index lists into offsets.
//!
//! ## Example
//!
//! ```text
//! struct S { i32 a; [4 x i16] b; i64 c }
//!
//! primitive size   = 32 + 4·16 + 64 = 160
//! layout           = [32, 64, 64]
//! &s[1].b[2]       = 1·160 + sum_behind(layout, 1) + sum_behind([16,16,16,16], 2)
//!                  = 160 + 32 + 32 = 224
//! ```
//!
//! Units are whatever the primitive sizes are expressed in (bits or bytes); the
//! analysis only compares offsets of the same unit.

use crate::features::offset_alias::domain::offset::{Offset, OffsetDomain};
use serde::{Deserialize, Serialize};

/// Shape of a type as far as displacement is concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeLayout {
    /// Scalar of the given size
    Primitive(i64),
    Array { element: Box<TypeLayout>, len: usize },
    Vector { element: Box<TypeLayout>, len: usize },
    Struct { fields: Vec<TypeLayout> },
}

/// One index of an element-pointer derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GepIndex {
    Constant(i64),
    /// Index known only to lie in `[lower, upper]`
    Range(i64, i64),
}

impl TypeLayout {
    pub fn array(element: TypeLayout, len: usize) -> Self {
        TypeLayout::Array {
            element: Box::new(element),
            len,
        }
    }

    pub fn structure(fields: impl IntoIterator<Item = TypeLayout>) -> Self {
        TypeLayout::Struct {
            fields: fields.into_iter().collect(),
        }
    }

    /// Total primitive size
    pub fn num_primitives(&self) -> i64 {
        match self {
            TypeLayout::Primitive(size) => *size,
            TypeLayout::Array { element, len } | TypeLayout::Vector { element, len } => {
                element.num_primitives().saturating_mul(*len as i64)
            }
            TypeLayout::Struct { fields } => fields
                .iter()
                .fold(0i64, |acc, f| acc.saturating_add(f.num_primitives())),
        }
    }

    /// Size of every direct child; a primitive is its own single child of size 1
    pub fn layout(&self) -> Vec<i64> {
        match self {
            TypeLayout::Primitive(_) => vec![1],
            TypeLayout::Array { element, len } | TypeLayout::Vector { element, len } => {
                vec![element.num_primitives(); *len]
            }
            TypeLayout::Struct { fields } => fields.iter().map(|f| f.num_primitives()).collect(),
        }
    }

    /// Child at position `index`
    pub fn type_inside(&self, index: usize) -> Option<&TypeLayout> {
        match self {
            TypeLayout::Primitive(_) => None,
            TypeLayout::Array { element, .. } | TypeLayout::Vector { element, .. } => {
                Some(element)
            }
            TypeLayout::Struct { fields } => fields.get(index),
        }
    }

    /// Offset of an element pointer derived from a pointer to `self`.
    ///
    /// The first index strides over whole values of `self`; every following
    /// index descends one level into the aggregate. A non-constant index into
    /// a struct loses track of the field, so the rest of the derivation is
    /// approximated by the whole extent of that struct.
    pub fn element_offset(&self, indices: &[GepIndex], domain: &OffsetDomain) -> Offset {
        let Some((first, rest)) = indices.split_first() else {
            return domain.neutral();
        };

        let stride = self.num_primitives();
        let (mut lower, mut upper) = match *first {
            GepIndex::Constant(i) => (stride.saturating_mul(i), stride.saturating_mul(i)),
            GepIndex::Range(lo, hi) => (stride.saturating_mul(lo), stride.saturating_mul(hi)),
        };

        let mut current = self;
        for index in rest {
            let layout = current.layout();
            match *index {
                GepIndex::Constant(i) => {
                    let behind = sum_behind(&layout, i.max(0) as usize);
                    lower = lower.saturating_add(behind);
                    upper = upper.saturating_add(behind);
                    match current.type_inside(i.max(0) as usize) {
                        Some(inner) => current = inner,
                        None => break,
                    }
                }
                GepIndex::Range(lo, hi) => {
                    lower = lower.saturating_add(sum_behind(&layout, lo.max(0) as usize));
                    match current {
                        TypeLayout::Struct { .. } => {
                            upper = upper.saturating_add(current.num_primitives());
                            break;
                        }
                        _ => {
                            upper = upper.saturating_add(sum_behind(&layout, hi.max(0) as usize));
                            match current.type_inside(0) {
                                Some(inner) => current = inner,
                                None => break,
                            }
                        }
                    }
                }
            }
        }

        domain.range(lower.min(upper), lower.max(upper))
    }
}

/// Sum of the first `index` entries (clamped to the layout length)
pub fn sum_behind(layout: &[i64], index: usize) -> i64 {
    layout
        .iter()
        .take(index.min(layout.len()))
        .fold(0i64, |acc, size| acc.saturating_add(*size))
}
