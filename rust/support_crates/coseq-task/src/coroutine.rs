//! Stepwise computations driven by a [`Task`](crate::Task).

use std::{future::Future, marker::PhantomData};

use futures::future::LocalBoxFuture;

use crate::step::Step;

/// How a coroutine is resumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resume<I, E> {
    /// The first call; no pending operation has been issued yet.
    Start,
    /// The pending operation succeeded with this value.
    Value(I),
    /// The pending operation failed. The error is raised at the suspension
    /// point: the coroutine may recover from it, fail with it, or fail with
    /// a different error.
    Error(E),
}

/// A pending operation erased to a boxed local future.
pub type BoxPending<I, E> = LocalBoxFuture<'static, Result<I, E>>;

/// A computation that runs until it completes, fails, or suspends on a
/// pending operation.
///
/// `resume` is called with [`Resume::Start`] first, then once per settled
/// pending operation, in the order the operations were yielded.
pub trait Coroutine {
    /// The success value of a pending operation.
    type Input;
    type Output;
    type Error;
    type Pending: Future<Output = Result<Self::Input, Self::Error>>;

    fn resume(
        &mut self,
        resume: Resume<Self::Input, Self::Error>,
    ) -> Step<Self::Pending, Self::Output, Self::Error>;
}

impl<C: Coroutine + ?Sized> Coroutine for Box<C> {
    type Input = C::Input;
    type Output = C::Output;
    type Error = C::Error;
    type Pending = C::Pending;

    fn resume(
        &mut self,
        resume: Resume<Self::Input, Self::Error>,
    ) -> Step<Self::Pending, Self::Output, Self::Error> {
        (**self).resume(resume)
    }
}

/// A coroutine backed by a closure that receives every [`Resume`].
pub struct FromFn<F, I, O, E, P> {
    f: F,
    _marker: PhantomData<fn(Resume<I, E>) -> Step<P, O, E>>,
}

/// Builds a coroutine from a closure; the closure keeps whatever state it
/// needs between resumptions.
pub fn from_fn<F, I, O, E, P>(f: F) -> FromFn<F, I, O, E, P>
where
    F: FnMut(Resume<I, E>) -> Step<P, O, E>,
    P: Future<Output = Result<I, E>>,
{
    FromFn {
        f,
        _marker: PhantomData,
    }
}

impl<F, I, O, E, P> Coroutine for FromFn<F, I, O, E, P>
where
    F: FnMut(Resume<I, E>) -> Step<P, O, E>,
    P: Future<Output = Result<I, E>>,
{
    type Input = I;
    type Output = O;
    type Error = E;
    type Pending = P;

    #[inline]
    fn resume(&mut self, resume: Resume<I, E>) -> Step<P, O, E> {
        (self.f)(resume)
    }
}

impl<F, I, O, E, P> std::fmt::Debug for FromFn<F, I, O, E, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FromFn")
    }
}

#[cfg(test)]
mod tests {
    use futures::future::{self, Ready};

    use super::*;

    #[test]
    fn test_from_fn_forwards_every_resume() {
        type Pending = Ready<Result<i32, String>>;

        let mut seen = Vec::new();
        let mut c = from_fn(|resume: Resume<i32, String>| -> Step<Pending, i32, String> {
            seen.push(resume.clone());
            match resume {
                Resume::Start => Step::Yielded(future::ready(Ok(1))),
                Resume::Value(v) => Step::Completed(v + 1),
                Resume::Error(e) => Step::Failed(e),
            }
        });
        assert!(c.resume(Resume::Start).is_yielded());
        assert_eq!(c.resume(Resume::Value(1)).into_result(), Some(Ok(2)));
        assert_eq!(
            c.resume(Resume::Error("x".into())).into_result(),
            Some(Err("x".to_string()))
        );
        drop(c);
        assert_eq!(
            seen,
            vec![Resume::Start, Resume::Value(1), Resume::Error("x".to_string())]
        );
    }
}
