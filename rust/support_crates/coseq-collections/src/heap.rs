//! Binary min-heap layered on [`GrowableArray`].
//!
//! The heap invariant holds after every public operation: for each index `i`
//! with children at `2i + 1` and `2i + 2`, `comparer(parent, child) <= 0`.
//! The minimal element under the comparer is therefore always at index 0.
//! Use a reversed comparer to get a max-heap.

use std::ops::Deref;

use coseq_common::{Error, Result};

use crate::{comparer::Comparer, growable_array::GrowableArray};

pub struct Heap<T> {
    items: GrowableArray<T>,
    comparer: Comparer<T>,
}

impl<T: PartialOrd + 'static> Heap<T> {
    /// Creates an empty heap ordered by `PartialOrd`.
    pub fn new() -> Heap<T> {
        Heap::with_comparer(Comparer::natural())
    }
}

impl<T: PartialOrd + 'static> Default for Heap<T> {
    fn default() -> Self {
        Heap::new()
    }
}

impl<T> Heap<T> {
    pub fn with_comparer(comparer: Comparer<T>) -> Heap<T> {
        Heap {
            items: GrowableArray::new(),
            comparer,
        }
    }

    pub fn comparer(&self) -> &Comparer<T> {
        &self.comparer
    }

    /// Returns the minimal element without removing it.
    pub fn peek_min(&self) -> Result<&T> {
        if self.items.is_empty() {
            return Err(Error::empty_structure("peek_min"));
        }
        self.items.front()
    }

    /// Inserts `value`, sifting it up while it is strictly less than its
    /// parent.
    pub fn push(&mut self, value: T) -> Result<()> {
        self.items.push_back(value);
        let mut x = self.items.len() - 1;
        while x > 0 {
            let parent = (x - 1) / 2;
            if self.less(x, parent)? {
                self.items.swap(x, parent)?;
                x = parent;
            } else {
                break;
            }
        }
        Ok(())
    }

    /// Removes and returns the minimal element.
    ///
    /// The last element replaces the root and sinks down: at each level the
    /// smaller child is chosen (the left one unless the right one is strictly
    /// smaller) and swapped while the current node is strictly greater.
    pub fn pop_min(&mut self) -> Result<T> {
        if self.items.len() < 2 {
            return self.items.pop_back();
        }

        let last = self.items.len() - 1;
        self.items.swap(0, last)?;
        let min = self.items.pop_back()?;

        let len = self.items.len();
        let mut x = 0;
        let mut child = 1;
        while child < len {
            if child + 1 < len && self.less(child + 1, child)? {
                child += 1;
            }
            if self.less(child, x)? {
                self.items.swap(x, child)?;
                x = child;
                child = x * 2 + 1;
            } else {
                break;
            }
        }
        Ok(min)
    }

    /// Drains the heap in comparer order.
    pub fn into_sorted_vec(mut self) -> Result<Vec<T>> {
        let mut sorted = Vec::with_capacity(self.items.len());
        while !self.items.is_empty() {
            sorted.push(self.pop_min()?);
        }
        Ok(sorted)
    }

    #[inline]
    fn less(&self, i: usize, j: usize) -> Result<bool> {
        Ok(self.comparer.is_less(self.items.at(i)?, self.items.at(j)?))
    }
}

/// Read-only access to the underlying array (`len`, `capacity`, `at`,
/// `iter`, ...). Mutation goes through `push`/`pop_min` only.
impl<T> Deref for Heap<T> {
    type Target = GrowableArray<T>;

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Heap<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heap").field("items", &self.items).finish()
    }
}
