//! Ordering primitives shared by the sequence engines.
//!
//! - [`GrowableArray`] - contiguous storage that grows by doubling and shrinks
//!   when three quarters of it are unused
//! - [`Heap`] - binary min-heap on top of `GrowableArray`, parameterized by a
//!   [`Comparer`]
//! - [`Comparer`] / [`ComparerSpec`] - three-way ordering functions built from
//!   natural order, key paths or a custom function
//! - [`KeyPath`] / [`Orderable`] - field extraction and natural ordering used
//!   by key-path comparers

pub mod comparer;
pub mod growable_array;
pub mod heap;
pub mod key_path;
pub mod orderable;

pub use comparer::{Comparer, ComparerSpec};
pub use growable_array::GrowableArray;
pub use heap::Heap;
pub use key_path::{KeyPath, PathSegment};
pub use orderable::Orderable;
