//! Lazy query sequences.
//!
//! - [`Sequence`] - synchronous, pull-based, with one-shot derived sequences
//! - [`AsyncSequence`] - the same query surface over a collection that
//!   becomes available asynchronously, processed strictly one element at a
//!   time
//!
//! Both engines share the [`Flow`] result that visitors use to stop early and
//! the [`Expand`] capability that decides what `flatten` opens up.

pub mod async_sequence;
pub mod expand;
pub mod flow;
pub mod group;
pub mod sequence;
pub mod transform;

pub use async_sequence::AsyncSequence;
pub use expand::{Expand, Expansion};
pub use flow::Flow;
pub use group::Group;
pub use sequence::{Iter, Sequence, Traversal};
