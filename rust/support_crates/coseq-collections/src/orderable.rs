//! Natural ordering and key extraction for values that can be sorted by a
//! [`ComparerSpec`](crate::ComparerSpec).

use std::{borrow::Cow, cmp::Ordering};

use serde_json::Value;

use crate::key_path::KeyPath;

/// A value with a "natural" order and, optionally, addressable fields.
///
/// `natural_cmp` follows the semantics of a `<` / `>` pair: when neither
/// operand is less than the other (incomparable kinds, NaN, absent keys),
/// the result is `Ordering::Equal`.
pub trait Orderable {
    fn natural_cmp(&self, other: &Self) -> Ordering;

    /// Extracts the value at `path`. Scalars have no fields and return
    /// `None`.
    fn lookup(&self, _path: &KeyPath) -> Option<Cow<'_, Value>> {
        None
    }
}

/// Compares two optional key values; an absent key is equal to anything.
pub fn compare_keys(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => l.natural_cmp(r),
        _ => Ordering::Equal,
    }
}

macro_rules! impl_orderable_partial_ord {
    ($($t:ty),* $(,)?) => {
        $(
            impl Orderable for $t {
                #[inline]
                fn natural_cmp(&self, other: &Self) -> Ordering {
                    self.partial_cmp(other).unwrap_or(Ordering::Equal)
                }
            }
        )*
    };
}

impl_orderable_partial_ord!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, String,
    &'static str,
);

impl<T: Orderable> Orderable for Vec<T> {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        compare_slices(self, other)
    }
}

impl<T: Orderable> Orderable for Option<T> {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Some(l), Some(r)) => l.natural_cmp(r),
            _ => Ordering::Equal,
        }
    }

    fn lookup(&self, path: &KeyPath) -> Option<Cow<'_, Value>> {
        self.as_ref().and_then(|v| v.lookup(path))
    }
}

impl Orderable for Value {
    fn natural_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(l), Value::Number(r)) => match (l.as_i64(), r.as_i64()) {
                (Some(l), Some(r)) => l.cmp(&r),
                _ => match (l.as_f64(), r.as_f64()) {
                    (Some(l), Some(r)) => l.natural_cmp(&r),
                    _ => Ordering::Equal,
                },
            },
            (Value::String(l), Value::String(r)) => l.cmp(r),
            (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
            (Value::Array(l), Value::Array(r)) => compare_slices(l, r),
            _ => Ordering::Equal,
        }
    }

    fn lookup(&self, path: &KeyPath) -> Option<Cow<'_, Value>> {
        path.lookup(self)
    }
}

/// Element-wise comparison; the first non-equal pair decides, then length.
fn compare_slices<T: Orderable>(left: &[T], right: &[T]) -> Ordering {
    left.iter()
        .zip(right)
        .map(|(l, r)| l.natural_cmp(r))
        .find(|o| o.is_ne())
        .unwrap_or_else(|| left.len().cmp(&right.len()))
}
