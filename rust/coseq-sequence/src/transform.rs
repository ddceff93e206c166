//! Iterator adapters behind the derived sequences.

use coseq_collections::{Comparer, Heap};
use coseq_common::{Result, try_or_ret_some_err};

use crate::sequence::Traversal;

/// When a [`Transform`] ends its traversal.
///
/// `stop` runs for an element only once the consumer pulls past it, so an
/// element that is mapped and emitted has to be kept until the next pull.
/// `keep` copies it before `map` takes ownership.
pub enum StopRule<T, S> {
    Never,
    When { stop: S, keep: fn(&T) -> T },
}

impl<T, S> StopRule<T, S> {
    pub fn when(stop: S) -> Self
    where
        T: Clone,
    {
        StopRule::When {
            stop,
            keep: T::clone,
        }
    }

    /// Copies `item` if its stop decision has to wait for the next pull.
    pub fn keep(&self, item: &T) -> Option<T> {
        match self {
            StopRule::Never => None,
            StopRule::When { keep, .. } => Some(keep(item)),
        }
    }

    pub fn holds(&mut self, item: &T, index: usize) -> bool
    where
        S: FnMut(&T, usize) -> bool,
    {
        match self {
            StopRule::Never => false,
            StopRule::When { stop, .. } => stop(item, index),
        }
    }
}

/// The `take` / `stop` / `map` primitive shared by `filter`, `map` and
/// `take_until`.
///
/// For every upstream element (with its upstream index): the element is
/// emitted as `map(element, index)` when `take` holds. The stop rule is
/// checked when the next element is requested; if it holds, the traversal
/// ends and upstream is not pulled again. An upstream error is yielded once
/// and ends the traversal as well.
pub struct Transform<T, P, S, M> {
    inner: Traversal<T>,
    take: P,
    stop: StopRule<T, S>,
    map: M,
    pending: Option<(T, usize)>,
    index: usize,
    done: bool,
}

impl<T, P, S, M> Transform<T, P, S, M> {
    pub fn new(inner: Traversal<T>, take: P, stop: StopRule<T, S>, map: M) -> Self {
        Transform {
            inner,
            take,
            stop,
            map,
            pending: None,
            index: 0,
            done: false,
        }
    }
}

impl<T, U, P, S, M> Iterator for Transform<T, P, S, M>
where
    P: FnMut(&T, usize) -> bool,
    S: FnMut(&T, usize) -> bool,
    M: FnMut(T, usize) -> U,
{
    type Item = Result<U>;

    fn next(&mut self) -> Option<Result<U>> {
        if let Some((item, index)) = self.pending.take() {
            if self.stop.holds(&item, index) {
                self.done = true;
            }
        }
        while !self.done {
            let item = match self.inner.next()? {
                Ok(item) => item,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            let index = self.index;
            self.index += 1;

            if (self.take)(&item, index) {
                self.pending = self.stop.keep(&item).map(|kept| (kept, index));
                return Some(Ok((self.map)(item, index)));
            }
            if self.stop.holds(&item, index) {
                self.done = true;
            }
        }
        None
    }
}

/// Pops a heap until it is empty.
pub struct HeapDrain<T> {
    heap: Heap<T>,
}

impl<T> HeapDrain<T> {
    pub fn new(heap: Heap<T>) -> Self {
        HeapDrain { heap }
    }
}

impl<T> Iterator for HeapDrain<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        if self.heap.is_empty() {
            return None;
        }
        Some(self.heap.pop_min())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.heap.len(), Some(self.heap.len()))
    }
}

/// Drops every element that compares equal to the element right before it.
/// Meant to run over sorted input.
pub struct Unique<T> {
    inner: Traversal<T>,
    comparer: Comparer<T>,
    prev: Option<T>,
}

impl<T> Unique<T> {
    pub fn new(inner: Traversal<T>, comparer: Comparer<T>) -> Self {
        Unique {
            inner,
            comparer,
            prev: None,
        }
    }
}

impl<T: Clone> Iterator for Unique<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Result<T>> {
        loop {
            let item = try_or_ret_some_err!(self.inner.next()?);
            let duplicate = self
                .prev
                .as_ref()
                .is_some_and(|prev| self.comparer.compare(prev, &item).is_eq());
            self.prev = Some(item.clone());
            if !duplicate {
                return Some(Ok(item));
            }
        }
    }
}
