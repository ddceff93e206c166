//! The lazy, pull-based synchronous query engine.
//!
//! A [`Sequence`] wraps either a *restartable* source, which can hand out a
//! fresh traversal any number of times, or a *one-shot* source, which can be
//! traversed once. Every derived sequence (`filter`, `map`, `flatten`,
//! `order_by`, `group_by`, ...) is one-shot: deriving does not touch the
//! parent, and the parent is traversed when the derived sequence is.
//!
//! Cloning a `Sequence` is cheap and shares the source, including the
//! consumption state of a one-shot source. A second traversal of a one-shot
//! sequence fails with `SequenceAlreadyConsumed`; [`Sequence::to_iterable`]
//! materializes into a restartable sequence that can be traversed again.

use std::{cell::RefCell, fmt, hash::Hash, rc::Rc};

use ahash::AHashMap;
use coseq_collections::{Comparer, ComparerSpec, Heap, Orderable};
use coseq_common::{Error, Result};
use num_traits::ToPrimitive;
use serde_json::Value;

use crate::{
    expand::Expand,
    flow::Flow,
    group::{CompositeKey, Group},
    transform::{HeapDrain, StopRule, Transform, Unique},
};

/// A single pass over a sequence. Items are `Err` only when an upstream
/// source could not be traversed (for example a consumed one-shot parent).
pub type Traversal<T> = Box<dyn Iterator<Item = Result<T>>>;

enum Source<T> {
    Restartable(Box<dyn Fn() -> Traversal<T>>),
    OneShot(RefCell<OneShot<T>>),
}

enum OneShot<T> {
    Fresh(Box<dyn FnOnce() -> Result<Traversal<T>>>),
    Consumed,
}

pub struct Sequence<T> {
    source: Rc<Source<T>>,
}

fn never_stop<T>() -> StopRule<T, fn(&T, usize) -> bool> {
    StopRule::Never
}

impl<T> Clone for Sequence<T> {
    fn clone(&self) -> Self {
        Sequence {
            source: self.source.clone(),
        }
    }
}

impl<T> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.source.as_ref() {
            Source::Restartable(_) => "restartable",
            Source::OneShot(cell) => match &*cell.borrow() {
                OneShot::Fresh(_) => "one-shot",
                OneShot::Consumed => "consumed",
            },
        };
        f.debug_struct("Sequence").field("source", &state).finish()
    }
}

impl<T: 'static> Sequence<T> {
    /// A restartable sequence over the elements of `items`.
    pub fn from_vec(items: Vec<T>) -> Sequence<T>
    where
        T: Clone,
    {
        let items: Rc<[T]> = items.into();
        Sequence::from_source(Source::Restartable(Box::new(move || {
            let items = items.clone();
            Box::new((0..items.len()).map(move |i| Ok(items[i].clone()))) as Traversal<T>
        })))
    }

    /// A restartable sequence that calls `factory` for every traversal.
    pub fn restartable<F, I>(factory: F) -> Sequence<T>
    where
        F: Fn() -> I + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        Sequence::from_source(Source::Restartable(Box::new(move || {
            Box::new(factory().into_iter().map(Ok)) as Traversal<T>
        })))
    }

    /// A one-shot sequence over an iterator, the counterpart of wrapping a
    /// generator.
    pub fn once<I>(items: I) -> Sequence<T>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        let iter = items.into_iter();
        Sequence::one_shot(move || Ok(Box::new(iter.map(Ok)) as Traversal<T>))
    }

    pub fn empty() -> Sequence<T> {
        Sequence::restartable(std::iter::empty)
    }

    fn from_source(source: Source<T>) -> Sequence<T> {
        Sequence {
            source: Rc::new(source),
        }
    }

    fn one_shot<F>(start: F) -> Sequence<T>
    where
        F: FnOnce() -> Result<Traversal<T>> + 'static,
    {
        Sequence::from_source(Source::OneShot(RefCell::new(OneShot::Fresh(Box::new(
            start,
        )))))
    }

    pub fn is_restartable(&self) -> bool {
        matches!(self.source.as_ref(), Source::Restartable(_))
    }

    /// Starts a traversal. For a one-shot source this marks it consumed.
    pub fn traverse(&self) -> Result<Traversal<T>> {
        match self.source.as_ref() {
            Source::Restartable(factory) => Ok(factory()),
            Source::OneShot(cell) => {
                let state = std::mem::replace(&mut *cell.borrow_mut(), OneShot::Consumed);
                match state {
                    OneShot::Fresh(start) => {
                        log::debug!("one-shot sequence consumed");
                        start()
                    }
                    OneShot::Consumed => {
                        log::debug!("refusing second traversal of a one-shot sequence");
                        Err(Error::sequence_already_consumed())
                    }
                }
            }
        }
    }

    /// Starts a traversal and returns it as an iterator of `Result<T>`.
    pub fn iter(&self) -> Result<Iter<T>> {
        self.traverse().map(|inner| Iter { inner })
    }

    fn derive<U, F>(&self, f: F) -> Sequence<U>
    where
        U: 'static,
        F: FnOnce(Traversal<T>) -> Result<Traversal<U>> + 'static,
    {
        let parent = self.clone();
        Sequence::one_shot(move || f(parent.traverse()?))
    }

    /// The single filtering primitive: for each element, in order, emits
    /// `map(element)` if `take` holds. `stop` runs for that element when the
    /// next one is requested, and if it holds the traversal ends without
    /// pulling further elements.
    pub fn transform<U, P, S, M>(&self, take: P, stop: S, map: M) -> Sequence<U>
    where
        T: Clone,
        U: 'static,
        P: FnMut(&T, usize) -> bool + 'static,
        S: FnMut(&T, usize) -> bool + 'static,
        M: FnMut(T, usize) -> U + 'static,
    {
        self.transform_with(take, StopRule::when(stop), map)
    }

    fn transform_with<U, P, S, M>(&self, take: P, stop: StopRule<T, S>, map: M) -> Sequence<U>
    where
        U: 'static,
        P: FnMut(&T, usize) -> bool + 'static,
        S: FnMut(&T, usize) -> bool + 'static,
        M: FnMut(T, usize) -> U + 'static,
    {
        self.derive(move |inner| {
            Ok(Box::new(Transform::new(inner, take, stop, map)) as Traversal<U>)
        })
    }

    #[doc(alias = "where")]
    pub fn filter<P>(&self, predicate: P) -> Sequence<T>
    where
        P: FnMut(&T, usize) -> bool + 'static,
    {
        self.transform_with(predicate, never_stop(), |v, _| v)
    }

    #[doc(alias = "select")]
    pub fn map<U, M>(&self, mapper: M) -> Sequence<U>
    where
        U: 'static,
        M: FnMut(T, usize) -> U + 'static,
    {
        self.transform_with(|_, _| true, never_stop(), mapper)
    }

    /// Yields elements up to and including the first one for which `stop`
    /// holds.
    pub fn take_until<S>(&self, stop: S) -> Sequence<T>
    where
        T: Clone,
        S: FnMut(&T, usize) -> bool + 'static,
    {
        self.transform(|_, _| true, stop, |v, _| v)
    }

    /// Sorts with the ascending comparer built from `spec`.
    ///
    /// Elements are pushed into a [`Heap`] and popped in order. Elements that
    /// compare equal may come out in any relative order.
    pub fn order_by(&self, spec: impl Into<ComparerSpec<T>>) -> Result<Sequence<T>>
    where
        T: Orderable,
    {
        Ok(self.order_by_comparer(Comparer::ascending(spec)?))
    }

    pub fn order_by_descending(&self, spec: impl Into<ComparerSpec<T>>) -> Result<Sequence<T>>
    where
        T: Orderable,
    {
        Ok(self.order_by_comparer(Comparer::descending(spec)?))
    }

    pub fn order_by_comparer(&self, comparer: Comparer<T>) -> Sequence<T> {
        self.derive(move |inner| {
            let mut heap = Heap::with_comparer(comparer);
            for item in inner {
                heap.push(item?)?;
            }
            log::debug!("order_by: sorting {} elements", heap.len());
            Ok(Box::new(HeapDrain::new(heap)) as Traversal<T>)
        })
    }

    /// Materializes the elements and yields them back to front.
    pub fn reverse(&self) -> Sequence<T> {
        self.derive(|inner| {
            let mut items = inner.collect::<Result<Vec<_>>>()?;
            items.reverse();
            Ok(Box::new(items.into_iter().map(Ok)) as Traversal<T>)
        })
    }

    /// Expands one level of nesting: elements that are collections yield
    /// their sub-elements, other elements are yielded unchanged.
    pub fn flatten(&self) -> Sequence<T::Item>
    where
        T: Expand,
        T::Item: 'static,
    {
        self.derive(|inner| {
            Ok(Box::new(inner.flat_map(|item| match item {
                Ok(value) => value.expand().into_traversal(),
                Err(e) => Box::new(std::iter::once(Err(e))) as Traversal<T::Item>,
            })) as Traversal<T::Item>)
        })
    }

    /// Groups elements by the composite value of `keys`, in the order in
    /// which each distinct key combination is first seen. Missing keys group
    /// as `null`.
    pub fn group_by<I, K>(&self, keys: I) -> Result<Sequence<Group<Vec<Value>, T>>>
    where
        T: Orderable + Clone,
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        let paths = keys
            .into_iter()
            .map(|k| coseq_collections::KeyPath::parse(k.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if paths.is_empty() {
            return Err(Error::invalid_comparer_spec("[]", "empty key path list"));
        }
        let grouped = self.group_by_key(move |item: &T| {
            CompositeKey(
                paths
                    .iter()
                    .map(|p| item.lookup(p).map_or(Value::Null, |v| v.into_owned()))
                    .collect(),
            )
        });
        Ok(grouped.map(|group, _| Group {
            key: group.key.0,
            items: group.items,
        }))
    }

    /// Groups elements by a hashable key computed from each element.
    pub fn group_by_key<K, F>(&self, mut key_of: F) -> Sequence<Group<K, T>>
    where
        T: Clone,
        K: Hash + Eq + Clone + 'static,
        F: FnMut(&T) -> K + 'static,
    {
        self.derive(move |inner| {
            let mut slots = AHashMap::<K, usize>::new();
            let mut groups: Vec<(K, Vec<T>)> = Vec::new();
            for item in inner {
                let item = item?;
                let key = key_of(&item);
                match slots.get(&key) {
                    Some(&slot) => groups[slot].1.push(item),
                    None => {
                        slots.insert(key.clone(), groups.len());
                        groups.push((key, vec![item]));
                    }
                }
            }
            log::debug!("group_by: {} groups", groups.len());
            Ok(Box::new(groups.into_iter().map(|(key, items)| {
                Ok(Group {
                    key,
                    items: Sequence::from_vec(items),
                })
            })) as Traversal<Group<K, T>>)
        })
    }

    /// Sorts by the comparer built from `spec` and drops every element that
    /// compares equal to the element sorted right before it.
    ///
    /// Survivors come out in sorted order, not in their original order.
    pub fn unique_by(&self, spec: impl Into<ComparerSpec<T>>) -> Result<Sequence<T>>
    where
        T: Orderable + Clone,
    {
        Ok(self.unique_by_comparer(Comparer::ascending(spec)?))
    }

    pub fn unique_by_comparer(&self, comparer: Comparer<T>) -> Sequence<T>
    where
        T: Clone,
    {
        let sorted = self.order_by_comparer(comparer.clone());
        sorted.derive(move |inner| Ok(Box::new(Unique::new(inner, comparer)) as Traversal<T>))
    }

    /// Materializes into a restartable, array-backed sequence.
    #[doc(alias = "to_array")]
    pub fn to_iterable(&self) -> Result<Sequence<T>>
    where
        T: Clone,
    {
        Ok(Sequence::from_vec(self.to_vec()?))
    }

    /// Visits every element with its index; a visitor returning
    /// `Flow::Stop` (or `false`) ends the traversal immediately.
    pub fn each<F, R>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(T, usize) -> R,
        R: Into<Flow>,
    {
        for (index, item) in self.traverse()?.enumerate() {
            let flow: Flow = visit(item?, index).into();
            if flow.is_stop() {
                break;
            }
        }
        Ok(())
    }

    #[doc(alias = "toArray")]
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.traverse()?.collect()
    }

    pub fn accumulate<A, F>(&self, seed: A, mut f: F) -> Result<A>
    where
        F: FnMut(A, T, usize) -> A,
    {
        let mut acc = seed;
        for (index, item) in self.traverse()?.enumerate() {
            acc = f(acc, item?, index);
        }
        Ok(acc)
    }

    /// Folds using the first element as the seed.
    pub fn reduce<F>(&self, mut f: F) -> Result<T>
    where
        F: FnMut(T, T) -> T,
    {
        let mut items = self.traverse()?;
        let first = items
            .next()
            .ok_or_else(|| Error::empty_structure("reduce"))??;
        items.try_fold(first, |acc, item| Ok(f(acc, item?)))
    }

    pub fn count(&self) -> Result<usize> {
        self.accumulate(0, |n, _, _| n + 1)
    }

    pub fn sum(&self) -> Result<T>
    where
        T: std::iter::Sum<T>,
    {
        self.traverse()?.sum()
    }

    /// `sum / count` over the elements as `f64`. An empty sequence has no
    /// average and fails with `DivideByEmpty`.
    pub fn average(&self) -> Result<f64>
    where
        T: ToPrimitive,
    {
        let (total, count) = self.accumulate((0f64, 0usize), |(total, count), v, _| {
            (total + v.to_f64().unwrap_or(f64::NAN), count + 1)
        })?;
        if count == 0 {
            return Err(Error::divide_by_empty("average"));
        }
        Ok(total / count as f64)
    }

    #[doc(alias = "empty")]
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.traverse()?.next().transpose()?.is_none())
    }

    pub fn first(&self) -> Result<T> {
        self.first_or_none()?
            .ok_or_else(|| Error::empty_structure("first"))
    }

    #[doc(alias = "first_or_null")]
    pub fn first_or_none(&self) -> Result<Option<T>> {
        self.traverse()?.next().transpose()
    }

    #[doc(alias = "first_or_value")]
    pub fn first_or(&self, default: T) -> Result<T> {
        Ok(self.first_or_none()?.unwrap_or(default))
    }

    pub fn last(&self) -> Result<T> {
        self.last_or_none()?
            .ok_or_else(|| Error::empty_structure("last"))
    }

    #[doc(alias = "last_or_null")]
    pub fn last_or_none(&self) -> Result<Option<T>> {
        self.traverse()?.try_fold(None, |_, item| item.map(Some))
    }

    #[doc(alias = "last_or_value")]
    pub fn last_or(&self, default: T) -> Result<T> {
        Ok(self.last_or_none()?.unwrap_or(default))
    }

    /// Returns the element at `index`, failing with `IndexOutOfBounds` when
    /// the sequence is shorter.
    pub fn at(&self, index: usize) -> Result<T> {
        let mut seen = 0;
        for item in self.traverse()? {
            let item = item?;
            if seen == index {
                return Ok(item);
            }
            seen += 1;
        }
        Err(Error::index_out_of_bounds(index, seen))
    }

    #[doc(alias = "at_or_null")]
    pub fn at_or_none(&self, index: usize) -> Result<Option<T>> {
        self.traverse()?.nth(index).transpose()
    }

    #[doc(alias = "at_or_value")]
    pub fn at_or(&self, index: usize, default: T) -> Result<T> {
        Ok(self.at_or_none(index)?.unwrap_or(default))
    }

    #[doc(alias = "every")]
    pub fn all<P>(&self, mut predicate: P) -> Result<bool>
    where
        P: FnMut(&T, usize) -> bool,
    {
        for (index, item) in self.traverse()?.enumerate() {
            if !predicate(&item?, index) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    #[doc(alias = "some")]
    pub fn any<P>(&self, mut predicate: P) -> Result<bool>
    where
        P: FnMut(&T, usize) -> bool,
    {
        for (index, item) in self.traverse()?.enumerate() {
            if predicate(&item?, index) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn none<P>(&self, predicate: P) -> Result<bool>
    where
        P: FnMut(&T, usize) -> bool,
    {
        Ok(!self.any(predicate)?)
    }
}

impl<T: Clone + 'static> From<Vec<T>> for Sequence<T> {
    fn from(items: Vec<T>) -> Self {
        Sequence::from_vec(items)
    }
}

impl<T: Clone + 'static> FromIterator<T> for Sequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Sequence::from_vec(iter.into_iter().collect())
    }
}

/// Iterator over one traversal of a [`Sequence`].
pub struct Iter<T> {
    inner: Traversal<T>,
}

impl<T> Iterator for Iter<T> {
    type Item = Result<T>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    const DATA: [i32; 6] = [0, 1, 2, 3, 4, 5];

    fn data() -> Sequence<i32> {
        Sequence::from_vec(DATA.to_vec())
    }

    fn generator() -> Sequence<i32> {
        Sequence::once(DATA)
    }

    #[test]
    fn test_each_visits_in_order() {
        let mut seen = Vec::new();
        data().each(|v, _| seen.push(v)).unwrap();
        assert_eq!(seen, DATA);
    }

    #[test]
    fn test_each_stops_on_false() {
        let mut seen = Vec::new();
        data()
            .each(|v, _| {
                seen.push(v);
                v != 2
            })
            .unwrap();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn test_each_over_one_shot_source() {
        let mut seen = Vec::new();
        generator()
            .each(|v, i| {
                assert_eq!(v as usize, i);
                seen.push(v);
                Flow::Continue
            })
            .unwrap();
        assert_eq!(seen, DATA);
    }

    #[test]
    fn test_filter_and_map_are_lazy() {
        let visited = Rc::new(Cell::new(0));
        let counter = visited.clone();
        let evens = data().filter(move |v, _| {
            counter.set(counter.get() + 1);
            v % 2 == 0
        });
        let doubled = evens.map(|v, _| v * 2);
        assert_eq!(visited.get(), 0);
        assert_eq!(doubled.to_vec().unwrap(), vec![0, 4, 8]);
        assert_eq!(visited.get(), 6);
    }

    #[test]
    fn test_transform_stops_without_pulling_further() {
        let pulled = Rc::new(Cell::new(0));
        let counter = pulled.clone();
        let source =
            Sequence::once(DATA.into_iter().inspect(move |_| counter.set(counter.get() + 1)));
        let out = source
            .transform(|v, _| v % 2 == 1, |v, _| *v == 3, |v, i| (v, i))
            .to_vec()
            .unwrap();
        assert_eq!(out, vec![(1, 1), (3, 3)]);
        assert_eq!(pulled.get(), 4);
    }

    fn logged_transform(log: &Rc<RefCell<Vec<String>>>) -> Sequence<i32> {
        let (take_log, stop_log, map_log) = (log.clone(), log.clone(), log.clone());
        Sequence::from_vec(vec![10, 11, 12]).transform(
            move |v, _| {
                take_log.borrow_mut().push(format!("take {v}"));
                true
            },
            move |v, _| {
                stop_log.borrow_mut().push(format!("stop {v}"));
                *v == 11
            },
            move |v, _| {
                map_log.borrow_mut().push(format!("map {v}"));
                v
            },
        )
    }

    #[test]
    fn test_transform_checks_stop_only_when_pulled_past() {
        let log = Rc::new(RefCell::new(Vec::new()));
        assert_eq!(logged_transform(&log).first().unwrap(), 10);
        assert_eq!(*log.borrow(), vec!["take 10", "map 10"]);

        log.borrow_mut().clear();
        assert_eq!(logged_transform(&log).to_vec().unwrap(), vec![10, 11]);
        assert_eq!(
            *log.borrow(),
            vec!["take 10", "map 10", "stop 10", "take 11", "map 11", "stop 11"]
        );
    }

    #[test]
    fn test_take_until_includes_stop_element() {
        assert_eq!(data().take_until(|v, _| *v == 2).to_vec().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_derived_sequence_is_one_shot() {
        let evens = data().filter(|v, _| v % 2 == 0);
        assert!(!evens.is_restartable());
        assert_eq!(evens.to_vec().unwrap(), vec![0, 2, 4]);
        assert!(evens.to_vec().unwrap_err().is_already_consumed());
        assert!(evens.count().unwrap_err().is_already_consumed());
    }

    #[test]
    fn test_map_and_flatten_are_one_shot() {
        let shifted = data().map(|v, _| v + 1);
        assert_eq!(shifted.to_vec().unwrap(), vec![1, 2, 3, 4, 5, 6]);
        assert!(shifted.to_vec().unwrap_err().is_already_consumed());

        let flat = Sequence::from_vec(vec![vec![1, 2], vec![3]]).flatten();
        assert!(!flat.is_restartable());
        assert_eq!(flat.to_vec().unwrap(), vec![1, 2, 3]);
        assert!(flat.to_vec().unwrap_err().is_already_consumed());
    }

    #[test]
    fn test_clones_share_consumption_state() {
        let seq = generator();
        let alias = seq.clone();
        assert_eq!(seq.count().unwrap(), 6);
        assert!(alias.first().unwrap_err().is_already_consumed());
    }

    #[test]
    fn test_to_iterable_allows_repeated_traversal() {
        let mapped = data().map(|v, _| v + 10).to_iterable().unwrap();
        assert!(mapped.is_restartable());
        let first = mapped.to_vec().unwrap();
        let second = mapped.to_vec().unwrap();
        assert_eq!(first, vec![10, 11, 12, 13, 14, 15]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_restartable_sources_can_be_reused() {
        let seq = data();
        assert_eq!(seq.count().unwrap(), 6);
        assert_eq!(seq.count().unwrap(), 6);

        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let seq = Sequence::restartable(move || {
            counter.set(counter.get() + 1);
            0..3
        });
        assert_eq!(seq.sum().unwrap(), 3);
        assert_eq!(seq.sum().unwrap(), 3);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_deriving_does_not_consume_parent() {
        let parent = generator();
        let _derived = parent.filter(|_, _| true);
        assert_eq!(parent.to_vec().unwrap(), DATA);
    }

    #[test]
    fn test_derived_of_consumed_parent_fails_on_traversal() {
        let parent = generator();
        let derived = parent.map(|v, _| v);
        parent.count().unwrap();
        assert!(derived.to_vec().unwrap_err().is_already_consumed());
    }

    #[test]
    fn test_aggregates() {
        assert_eq!(data().accumulate(0, |acc, v, _| acc + v * 3).unwrap(), 45);
        assert_eq!(data().reduce(|a, b| a.max(b)).unwrap(), 5);
        assert_eq!(data().count().unwrap(), 6);
        assert_eq!(data().sum().unwrap(), 15);
        assert_eq!(data().average().unwrap(), 2.5);
        assert!(!data().is_empty().unwrap());

        let empty = Sequence::<i32>::empty();
        assert!(empty.is_empty().unwrap());
        assert_eq!(empty.sum().unwrap(), 0);
        assert!(empty.reduce(|a, b| a + b).unwrap_err().is_empty_structure());
        assert!(matches!(
            empty.average().unwrap_err().kind(),
            coseq_common::ErrorKind::DivideByEmpty { .. }
        ));
    }

    #[test]
    fn test_element_access() {
        assert_eq!(data().first().unwrap(), 0);
        assert_eq!(data().last().unwrap(), 5);
        assert_eq!(data().at(3).unwrap(), 3);
        assert_eq!(data().first_or(-1).unwrap(), 0);
        assert_eq!(data().last_or_none().unwrap(), Some(5));
        assert_eq!(data().at_or_none(9).unwrap(), None);
        assert_eq!(data().at_or(9, 42).unwrap(), 42);

        let err = data().at(6).unwrap_err();
        assert!(err.is_index_out_of_bounds());

        let empty = Sequence::<&str>::from_vec(vec![]);
        assert!(empty.first().unwrap_err().is_empty_structure());
        assert!(empty.last().unwrap_err().is_empty_structure());
        assert_eq!(empty.first_or("salam").unwrap(), "salam");
        assert_eq!(empty.last_or("salam").unwrap(), "salam");
        assert_eq!(empty.first_or_none().unwrap(), None);
    }

    #[test]
    fn test_quantifiers() {
        assert!(data().all(|v, _| *v < 6).unwrap());
        assert!(!data().all(|v, _| *v < 5).unwrap());
        assert!(data().any(|v, _| *v == 4).unwrap());
        assert!(data().none(|v, _| *v > 5).unwrap());
        assert!(Sequence::<i32>::empty().all(|_, _| false).unwrap());
    }

    #[test]
    fn test_any_stops_early() {
        let pulled = Rc::new(Cell::new(0));
        let counter = pulled.clone();
        let seq = Sequence::once(DATA.into_iter().inspect(move |_| counter.set(counter.get() + 1)));
        assert!(seq.any(|v, _| *v == 1).unwrap());
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn test_order_by_and_reverse() {
        let seq = Sequence::from_vec(vec![8, 3, 5, 9, 1, 10, 0, 2, 6, 7]);
        assert_eq!(
            seq.order_by(()).unwrap().to_vec().unwrap(),
            vec![0, 1, 2, 3, 5, 6, 7, 8, 9, 10]
        );
        assert_eq!(
            seq.order_by_descending(()).unwrap().to_vec().unwrap(),
            vec![10, 9, 8, 7, 6, 5, 3, 2, 1, 0]
        );
        assert_eq!(data().reverse().to_vec().unwrap(), vec![5, 4, 3, 2, 1, 0]);
    }

    #[test]
    fn test_order_by_is_a_sorted_permutation() {
        let mut rng = fastrand::Rng::with_seed(7);
        for len in [0usize, 1, 2, 17, 100] {
            let input: Vec<i64> = (0..len).map(|_| rng.i64(-50..50)).collect();
            let sorted = Sequence::from_vec(input.clone())
                .order_by(())
                .unwrap()
                .to_vec()
                .unwrap();
            let mut expected = input;
            expected.sort();
            assert_eq!(sorted, expected);
        }
    }

    #[test]
    fn test_flatten_one_level() {
        let nested = Sequence::from_vec(vec![vec![1, 2], vec![], vec![3]]);
        assert_eq!(nested.flatten().to_vec().unwrap(), vec![1, 2, 3]);

        let deep = Sequence::from_vec(vec![vec![vec![1], vec![2, 3]]]);
        assert_eq!(deep.flatten().to_vec().unwrap(), vec![vec![1], vec![2, 3]]);
    }

    #[test]
    fn test_unique_by_is_adjacent_dedup_after_sort() {
        let seq = Sequence::from_vec(vec![3, 1, 3, 2, 1, 3]);
        assert_eq!(seq.unique_by(()).unwrap().to_vec().unwrap(), vec![1, 2, 3]);

        let by_parity = Comparer::from_fn(|a: &i32, b: &i32| (a % 2).cmp(&(b % 2)));
        let survivors = Sequence::from_vec(vec![4, 7, 2, 9])
            .unique_by_comparer(by_parity)
            .to_vec()
            .unwrap();
        assert_eq!(survivors.len(), 2);
        assert_eq!(survivors[0] % 2, 0);
        assert_eq!(survivors[1] % 2, 1);
    }

    #[test]
    fn test_group_by_key() {
        let groups = data()
            .group_by_key(|v| v % 3)
            .map(|g, _| (g.key, g.items.to_vec().unwrap()))
            .to_vec()
            .unwrap();
        assert_eq!(groups, vec![(0, vec![0, 3]), (1, vec![1, 4]), (2, vec![2, 5])]);
    }

    #[test]
    fn test_invalid_comparer_spec_is_reported_eagerly() {
        let err = Sequence::from_vec(vec![Value::Null]).order_by("a..b").unwrap_err();
        assert!(matches!(
            err.kind(),
            coseq_common::ErrorKind::InvalidComparerSpec { .. }
        ));
        let err = Sequence::from_vec(vec![Value::Null])
            .group_by(Vec::<String>::new())
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            coseq_common::ErrorKind::InvalidComparerSpec { .. }
        ));
    }

    #[test]
    fn test_iter() {
        let seq = generator();
        let items: Vec<i32> = seq.iter().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(items, DATA);
        assert!(seq.iter().is_err());
    }
}
