//! # coseq: lazy sequences, ordered collections and a coroutine trampoline
//!
//! coseq bundles a small set of building blocks for querying in-memory and
//! asynchronously produced data in a single-threaded, cooperative setting.
//!
//! ## Module Organization
//!
//! * [`common`] - Error type, result alias and the async runtime helper
//! * [`collections`] - `GrowableArray`, the binary `Heap` and the comparer
//!   factory (natural order, key paths, custom functions)
//! * [`sequence`] - The lazy synchronous `Sequence` and the sequential
//!   `AsyncSequence`
//! * [`task`] - The `Coroutine` trait and the `Task` trampoline that drives a
//!   coroutine through its pending operations
//!
//! Most programs only need the [`prelude`].
//!
//! ## Getting Started
//!
//! ```ignore
//! use coseq::prelude::*;
//! use serde_json::json;
//!
//! let people = Sequence::from_vec(vec![
//!     json!({ "name": "ann", "age": 30 }),
//!     json!({ "name": "bob", "age": 25 }),
//! ]);
//! let names = people
//!     .order_by(["age", "name"])?
//!     .map(|p, _| p["name"].clone())
//!     .to_vec()?;
//! ```

pub use coseq_collections as collections;
pub use coseq_common as common;
pub use coseq_sequence as sequence;
pub use coseq_task as task;

pub mod prelude {
    pub use coseq_collections::{Comparer, ComparerSpec, GrowableArray, Heap, Orderable};
    pub use coseq_common::{Error, ErrorKind, Result};
    pub use coseq_sequence::{AsyncSequence, Expand, Flow, Group, Sequence};
    pub use coseq_task::{Coroutine, Resume, Step, Task, TaskStatus, from_callback, from_fn};
}
