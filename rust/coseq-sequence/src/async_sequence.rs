//! Sequential query operations over a collection that becomes available
//! asynchronously.
//!
//! An [`AsyncSequence`] wraps a local stream of `Result<T, E>`. Every
//! operation pulls one element, awaits all the work for it (predicate,
//! mapper, visitor), and only then pulls the next one; elements are never
//! processed concurrently. The first error, whether produced by the source
//! or by a callback, aborts the traversal and is returned unchanged.
//!
//! Operations take `self`, so an async sequence is traversed at most once by
//! construction. Use [`AsyncSequence::to_sequence`] to materialize it into a
//! synchronous [`Sequence`] for sorting or grouping.

use std::future::Future;

use coseq_common::Error;
use futures::{
    TryStreamExt,
    future,
    stream::{self, LocalBoxStream, Stream, StreamExt},
};
use num_traits::ToPrimitive;

use crate::{expand::Expand, flow::Flow, sequence::Sequence, transform::StopRule};

pub struct AsyncSequence<T, E = Error> {
    stream: LocalBoxStream<'static, Result<T, E>>,
}

impl<T: 'static, E: 'static> AsyncSequence<T, E> {
    pub fn from_stream<S>(stream: S) -> AsyncSequence<T, E>
    where
        S: Stream<Item = Result<T, E>> + 'static,
    {
        AsyncSequence {
            stream: stream.boxed_local(),
        }
    }

    /// An async sequence over elements that are already available.
    pub fn from_items<I>(items: I) -> AsyncSequence<T, E>
    where
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        AsyncSequence::from_stream(stream::iter(items.into_iter().map(Ok)))
    }

    /// An async sequence over the collection `future` resolves to. A failed
    /// future fails every operation with its error.
    pub fn from_future<F, I>(future: F) -> AsyncSequence<T, E>
    where
        F: Future<Output = Result<I, E>> + 'static,
        I: IntoIterator<Item = T>,
        I::IntoIter: 'static,
    {
        AsyncSequence::from_stream(
            stream::once(future)
                .map_ok(|items| stream::iter(items.into_iter().map(Ok::<T, E>)))
                .try_flatten(),
        )
    }

    /// Traverses `sequence` when the async sequence is first polled.
    pub fn from_sequence(sequence: Sequence<T>) -> AsyncSequence<T, E>
    where
        E: From<Error>,
    {
        AsyncSequence::from_stream(
            stream::once(async move { sequence.traverse() })
                .map_ok(stream::iter)
                .try_flatten()
                .map_err(E::from),
        )
    }

    pub fn into_stream(self) -> LocalBoxStream<'static, Result<T, E>> {
        self.stream
    }

    /// The asynchronous counterpart of [`Sequence::transform`]: each
    /// callback result is awaited before the next step runs, and `stop` for
    /// an emitted element is awaited only when the next element is pulled.
    pub fn transform<U, P, PF, S, SF, M, MF>(self, take: P, stop: S, map: M) -> AsyncSequence<U, E>
    where
        T: Clone,
        U: 'static,
        P: FnMut(&T, usize) -> PF + 'static,
        PF: Future<Output = Result<bool, E>> + 'static,
        S: FnMut(&T, usize) -> SF + 'static,
        SF: Future<Output = Result<bool, E>> + 'static,
        M: FnMut(T, usize) -> MF + 'static,
        MF: Future<Output = Result<U, E>> + 'static,
    {
        self.transform_with(take, StopRule::when(stop), map)
    }

    fn transform_with<U, P, PF, S, SF, M, MF>(
        self,
        take: P,
        stop: StopRule<T, S>,
        map: M,
    ) -> AsyncSequence<U, E>
    where
        U: 'static,
        P: FnMut(&T, usize) -> PF + 'static,
        PF: Future<Output = Result<bool, E>> + 'static,
        S: FnMut(&T, usize) -> SF + 'static,
        SF: Future<Output = Result<bool, E>> + 'static,
        M: FnMut(T, usize) -> MF + 'static,
        MF: Future<Output = Result<U, E>> + 'static,
    {
        let state = TransformState {
            inner: self.stream,
            take,
            stop,
            map,
            pending: None,
            index: 0,
            done: false,
        };
        AsyncSequence::from_stream(stream::try_unfold(state, |state| state.step()))
    }

    #[doc(alias = "where")]
    pub fn filter<P, PF>(self, predicate: P) -> AsyncSequence<T, E>
    where
        P: FnMut(&T, usize) -> PF + 'static,
        PF: Future<Output = Result<bool, E>> + 'static,
    {
        self.transform_with(predicate, never_stop(), |v, _| future::ready(Ok(v)))
    }

    #[doc(alias = "select")]
    pub fn map<U, M, MF>(self, mapper: M) -> AsyncSequence<U, E>
    where
        U: 'static,
        M: FnMut(T, usize) -> MF + 'static,
        MF: Future<Output = Result<U, E>> + 'static,
    {
        self.transform_with(|_, _| future::ready(Ok(true)), never_stop(), mapper)
    }

    /// Expands one level of nesting, like [`Sequence::flatten`].
    pub fn flatten(self) -> AsyncSequence<T::Item, E>
    where
        T: Expand,
        T::Item: 'static,
        E: From<Error>,
    {
        AsyncSequence::from_stream(
            self.stream
                .map_ok(|value| stream::iter(value.expand().into_traversal()).map_err(E::from))
                .try_flatten(),
        )
    }

    /// Visits elements in order. The next element is pulled only after the
    /// visitor's future settles; resolving to `Flow::Stop` (or `false`) ends
    /// the traversal.
    pub async fn each<F, Fut, R>(mut self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(T, usize) -> Fut,
        Fut: Future<Output = Result<R, E>>,
        R: Into<Flow>,
    {
        let mut index = 0;
        while let Some(item) = self.stream.try_next().await? {
            let flow: Flow = visit(item, index).await?.into();
            if flow.is_stop() {
                break;
            }
            index += 1;
        }
        Ok(())
    }

    #[doc(alias = "to_array")]
    pub async fn to_vec(self) -> Result<Vec<T>, E> {
        self.stream.try_collect().await
    }

    pub async fn to_sequence(self) -> Result<Sequence<T>, E>
    where
        T: Clone,
    {
        Ok(Sequence::from_vec(self.to_vec().await?))
    }

    pub async fn accumulate<A, F, Fut>(mut self, seed: A, mut f: F) -> Result<A, E>
    where
        F: FnMut(A, T, usize) -> Fut,
        Fut: Future<Output = Result<A, E>>,
    {
        let mut acc = seed;
        let mut index = 0;
        while let Some(item) = self.stream.try_next().await? {
            acc = f(acc, item, index).await?;
            index += 1;
        }
        Ok(acc)
    }

    pub async fn reduce<F, Fut>(mut self, mut f: F) -> Result<T, E>
    where
        F: FnMut(T, T) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<Error>,
    {
        let mut acc = match self.stream.try_next().await? {
            Some(first) => first,
            None => return Err(Error::empty_structure("reduce").into()),
        };
        while let Some(item) = self.stream.try_next().await? {
            acc = f(acc, item).await?;
        }
        Ok(acc)
    }

    pub async fn count(self) -> Result<usize, E> {
        self.stream.try_fold(0, |n, _| future::ready(Ok(n + 1))).await
    }

    /// Adds elements up as they arrive, without buffering them.
    pub async fn sum(self) -> Result<T, E>
    where
        T: std::iter::Sum<T>,
    {
        let total = self
            .stream
            .try_fold(None, |total: Option<T>, v| {
                future::ready(Ok(Some(match total {
                    Some(total) => [total, v].into_iter().sum(),
                    None => v,
                })))
            })
            .await?;
        Ok(total.unwrap_or_else(|| std::iter::empty().sum()))
    }

    /// Fails with `DivideByEmpty` when there are no elements.
    pub async fn average(self) -> Result<f64, E>
    where
        T: ToPrimitive,
        E: From<Error>,
    {
        let (total, count) = self
            .stream
            .try_fold((0f64, 0usize), |(total, count), v| {
                future::ready(Ok((total + v.to_f64().unwrap_or(f64::NAN), count + 1)))
            })
            .await?;
        if count == 0 {
            return Err(Error::divide_by_empty("average").into());
        }
        Ok(total / count as f64)
    }

    #[doc(alias = "empty")]
    pub async fn is_empty(mut self) -> Result<bool, E> {
        Ok(self.stream.try_next().await?.is_none())
    }

    pub async fn first(self) -> Result<T, E>
    where
        E: From<Error>,
    {
        self.first_or_none()
            .await?
            .ok_or_else(|| Error::empty_structure("first").into())
    }

    #[doc(alias = "first_or_null")]
    pub async fn first_or_none(mut self) -> Result<Option<T>, E> {
        self.stream.try_next().await
    }

    #[doc(alias = "first_or_value")]
    pub async fn first_or(self, default: T) -> Result<T, E> {
        Ok(self.first_or_none().await?.unwrap_or(default))
    }

    pub async fn last(self) -> Result<T, E>
    where
        E: From<Error>,
    {
        self.last_or_none()
            .await?
            .ok_or_else(|| Error::empty_structure("last").into())
    }

    #[doc(alias = "last_or_null")]
    pub async fn last_or_none(self) -> Result<Option<T>, E> {
        self.stream
            .try_fold(None, |_, item| future::ready(Ok(Some(item))))
            .await
    }

    #[doc(alias = "last_or_value")]
    pub async fn last_or(self, default: T) -> Result<T, E> {
        Ok(self.last_or_none().await?.unwrap_or(default))
    }

    pub async fn at(mut self, index: usize) -> Result<T, E>
    where
        E: From<Error>,
    {
        let mut seen = 0;
        while let Some(item) = self.stream.try_next().await? {
            if seen == index {
                return Ok(item);
            }
            seen += 1;
        }
        Err(Error::index_out_of_bounds(index, seen).into())
    }

    #[doc(alias = "at_or_null")]
    pub async fn at_or_none(mut self, index: usize) -> Result<Option<T>, E> {
        let mut seen = 0;
        while let Some(item) = self.stream.try_next().await? {
            if seen == index {
                return Ok(Some(item));
            }
            seen += 1;
        }
        Ok(None)
    }

    #[doc(alias = "at_or_value")]
    pub async fn at_or(self, index: usize, default: T) -> Result<T, E> {
        Ok(self.at_or_none(index).await?.unwrap_or(default))
    }

    #[doc(alias = "some")]
    pub async fn any<P, PF>(mut self, mut predicate: P) -> Result<bool, E>
    where
        P: FnMut(&T, usize) -> PF,
        PF: Future<Output = Result<bool, E>>,
    {
        let mut index = 0;
        while let Some(item) = self.stream.try_next().await? {
            if predicate(&item, index).await? {
                return Ok(true);
            }
            index += 1;
        }
        Ok(false)
    }

    #[doc(alias = "every")]
    pub async fn all<P, PF>(mut self, mut predicate: P) -> Result<bool, E>
    where
        P: FnMut(&T, usize) -> PF,
        PF: Future<Output = Result<bool, E>>,
    {
        let mut index = 0;
        while let Some(item) = self.stream.try_next().await? {
            if !predicate(&item, index).await? {
                return Ok(false);
            }
            index += 1;
        }
        Ok(true)
    }

    pub async fn none<P, PF>(self, predicate: P) -> Result<bool, E>
    where
        P: FnMut(&T, usize) -> PF,
        PF: Future<Output = Result<bool, E>>,
    {
        Ok(!self.any(predicate).await?)
    }
}

impl<T: 'static, E: 'static> From<Vec<T>> for AsyncSequence<T, E> {
    fn from(items: Vec<T>) -> Self {
        AsyncSequence::from_items(items)
    }
}

impl<T, E> std::fmt::Debug for AsyncSequence<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AsyncSequence")
    }
}

type NeverStop<T, E> = fn(&T, usize) -> future::Ready<Result<bool, E>>;

fn never_stop<T, E>() -> StopRule<T, NeverStop<T, E>> {
    StopRule::Never
}

struct TransformState<T, E, P, S, M> {
    inner: LocalBoxStream<'static, Result<T, E>>,
    take: P,
    stop: StopRule<T, S>,
    map: M,
    pending: Option<(T, usize)>,
    index: usize,
    done: bool,
}

impl<T, E, P, S, M> TransformState<T, E, P, S, M> {
    async fn step<U, PF, SF, MF>(mut self) -> Result<Option<(U, Self)>, E>
    where
        P: FnMut(&T, usize) -> PF,
        PF: Future<Output = Result<bool, E>>,
        S: FnMut(&T, usize) -> SF,
        SF: Future<Output = Result<bool, E>>,
        M: FnMut(T, usize) -> MF,
        MF: Future<Output = Result<U, E>>,
    {
        if let Some((item, index)) = self.pending.take() {
            if self.stops(&item, index).await? {
                self.done = true;
            }
        }
        while !self.done {
            let Some(item) = self.inner.try_next().await? else {
                return Ok(None);
            };
            let index = self.index;
            self.index += 1;

            if (self.take)(&item, index).await? {
                self.pending = self.stop.keep(&item).map(|kept| (kept, index));
                let value = (self.map)(item, index).await?;
                return Ok(Some((value, self)));
            }
            if self.stops(&item, index).await? {
                self.done = true;
            }
        }
        Ok(None)
    }

    async fn stops<SF>(&mut self, item: &T, index: usize) -> Result<bool, E>
    where
        S: FnMut(&T, usize) -> SF,
        SF: Future<Output = Result<bool, E>>,
    {
        match &mut self.stop {
            StopRule::Never => Ok(false),
            StopRule::When { stop, .. } => stop(item, index).await,
        }
    }
}
