//! A contiguous, indexable buffer that grows and shrinks only at its end.
//!
//! `GrowableArray<T>` tracks its logical capacity explicitly instead of
//! deferring to the allocator policy of `Vec`, so the capacity observed by
//! callers follows a fixed schedule:
//!
//! - **Growth**: when a push would exceed the capacity, the capacity becomes
//!   `max(1, 2 * len)`.
//! - **Shrink**: after a pop, if `len <= capacity / 4`, the capacity is reset
//!   to `2 * len`.
//!
//! Pushing `N` elements into an empty array therefore leaves the capacity at
//! the smallest power of two `>= N`.

use coseq_common::{Error, Result};

/// Contiguous storage with amortized O(1) append and remove at the end.
///
/// Only the logical end can be mutated structurally; elements in the middle
/// can be read or replaced in place, but not inserted or removed.
#[derive(Clone)]
pub struct GrowableArray<T> {
    /// Backing slots. `slots.len()` is the capacity; the first `len` slots
    /// are always `Some`, the rest are always `None`.
    slots: Box<[Option<T>]>,
    len: usize,
}

impl<T> GrowableArray<T> {
    /// Creates an empty array with zero capacity.
    pub fn new() -> GrowableArray<T> {
        GrowableArray {
            slots: Box::default(),
            len: 0,
        }
    }

    /// Creates an empty array whose capacity is exactly `capacity`.
    pub fn with_capacity(capacity: usize) -> GrowableArray<T> {
        GrowableArray {
            slots: empty_slots(capacity),
            len: 0,
        }
    }

    /// Returns the number of elements in the array.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns the number of slots currently allocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drops all elements and releases the buffer (capacity becomes zero).
    pub fn clear(&mut self) {
        self.slots = Box::default();
        self.len = 0;
    }

    /// Appends `value` at the end, doubling the capacity when full.
    pub fn push_back(&mut self, value: T) {
        self.expand();
        self.slots[self.len] = Some(value);
        self.len += 1;
    }

    /// Removes and returns the last element.
    ///
    /// Fails with `EmptyStructure` when the array is empty.
    pub fn pop_back(&mut self) -> Result<T> {
        if self.is_empty() {
            return Err(Error::empty_structure("pop_back"));
        }
        self.len -= 1;
        let value = self.slots[self.len].take();
        self.contract();
        value.ok_or_else(|| Error::invalid_operation("pop_back: vacant slot"))
    }

    /// Returns a reference to the element at `index`.
    pub fn at(&self, index: usize) -> Result<&T> {
        self.check_index(index)?;
        self.slots[index]
            .as_ref()
            .ok_or_else(|| Error::index_out_of_bounds(index, self.len))
    }

    /// Returns a mutable reference to the element at `index`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        self.check_index(index)?;
        let len = self.len;
        self.slots[index]
            .as_mut()
            .ok_or_else(|| Error::index_out_of_bounds(index, len))
    }

    /// Replaces the element at `index`, returning the previous value.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        Ok(std::mem::replace(self.at_mut(index)?, value))
    }

    pub fn front(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(Error::empty_structure("front"));
        }
        self.at(0)
    }

    pub fn back(&self) -> Result<&T> {
        if self.is_empty() {
            return Err(Error::empty_structure("back"));
        }
        self.at(self.len - 1)
    }

    pub fn set_front(&mut self, value: T) -> Result<T> {
        if self.is_empty() {
            return Err(Error::empty_structure("set_front"));
        }
        self.set(0, value)
    }

    pub fn set_back(&mut self, value: T) -> Result<T> {
        if self.is_empty() {
            return Err(Error::empty_structure("set_back"));
        }
        self.set(self.len - 1, value)
    }

    /// Swaps two elements in place.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<()> {
        self.check_index(i)?;
        self.check_index(j)?;
        self.slots.swap(i, j);
        Ok(())
    }

    /// Iterates over exactly `len()` elements, front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.slots[..self.len].iter(),
        }
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.len {
            Ok(())
        } else {
            Err(Error::index_out_of_bounds(index, self.len))
        }
    }

    fn expand(&mut self) {
        if self.len >= self.capacity() {
            self.resize(std::cmp::max(1, self.len * 2));
        }
    }

    fn contract(&mut self) {
        if self.len <= self.capacity() / 4 {
            self.resize(self.len * 2);
        }
    }

    fn resize(&mut self, new_capacity: usize) {
        debug_assert!(new_capacity >= self.len);
        log::trace!(
            "growable array resize: {} -> {} (len {})",
            self.capacity(),
            new_capacity,
            self.len
        );
        let mut slots = empty_slots(new_capacity);
        for (dst, src) in slots.iter_mut().zip(self.slots[..self.len].iter_mut()) {
            *dst = src.take();
        }
        self.slots = slots;
    }
}

fn empty_slots<T>(capacity: usize) -> Box<[Option<T>]> {
    std::iter::repeat_with(|| None).take(capacity).collect()
}

impl<T> Default for GrowableArray<T> {
    fn default() -> Self {
        GrowableArray::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for GrowableArray<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrowableArray")
            .field("len", &self.len)
            .field("capacity", &self.capacity())
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T> FromIterator<T> for GrowableArray<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut array = GrowableArray::new();
        array.extend(iter);
        array
    }
}

impl<T> Extend<T> for GrowableArray<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

/// Borrowing iterator over a [`GrowableArray`].
pub struct Iter<'a, T> {
    inner: std::slice::Iter<'a, Option<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().and_then(Option::as_ref)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a GrowableArray<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning iterator over a [`GrowableArray`].
pub struct IntoIter<T> {
    inner: std::iter::Take<std::vec::IntoIter<Option<T>>>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().flatten()
    }
}

impl<T> IntoIterator for GrowableArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let len = self.len;
        IntoIter {
            inner: self.slots.into_vec().into_iter().take(len),
        }
    }
}
