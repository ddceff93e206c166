//! Capability trait deciding whether an element is itself a collection that
//! `flatten` should open up.

use coseq_collections::GrowableArray;
use serde_json::Value;

use crate::sequence::{Sequence, Traversal};

/// The result of expanding one element: either the element itself or the
/// sub-elements it contains.
pub enum Expansion<T> {
    Single(T),
    Many(Traversal<T>),
}

impl<T: 'static> Expansion<T> {
    pub fn into_traversal(self) -> Traversal<T> {
        match self {
            Expansion::Single(value) => Box::new(std::iter::once(Ok(value))),
            Expansion::Many(items) => items,
        }
    }
}

/// Implemented by element types that `flatten` accepts.
pub trait Expand: Sized {
    type Item;

    fn expand(self) -> Expansion<Self::Item>;
}

impl<T: 'static> Expand for Vec<T> {
    type Item = T;

    fn expand(self) -> Expansion<T> {
        Expansion::Many(Box::new(self.into_iter().map(Ok)))
    }
}

impl<T: 'static> Expand for Option<T> {
    type Item = T;

    fn expand(self) -> Expansion<T> {
        Expansion::Many(Box::new(self.into_iter().map(Ok)))
    }
}

impl<T: 'static> Expand for GrowableArray<T> {
    type Item = T;

    fn expand(self) -> Expansion<T> {
        Expansion::Many(Box::new(self.into_iter().map(Ok)))
    }
}

/// A nested sequence is traversed when the outer traversal reaches it; a
/// failure to start it (already consumed) surfaces as an error item.
impl<T: 'static> Expand for Sequence<T> {
    type Item = T;

    fn expand(self) -> Expansion<T> {
        match self.traverse() {
            Ok(items) => Expansion::Many(items),
            Err(e) => Expansion::Many(Box::new(std::iter::once(Err(e)))),
        }
    }
}

/// JSON arrays are expanded; every other value is yielded as is.
impl Expand for Value {
    type Item = Value;

    fn expand(self) -> Expansion<Value> {
        match self {
            Value::Array(items) => Expansion::Many(Box::new(items.into_iter().map(Ok))),
            other => Expansion::Single(other),
        }
    }
}
