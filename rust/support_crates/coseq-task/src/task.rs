//! The trampoline that drives a [`Coroutine`] to completion.
//!
//! A [`Task`] is a future. Each poll runs a loop: resume the coroutine, and
//! if it yields a pending operation, poll that operation right away. An
//! operation that is already settled feeds straight back into the next
//! resumption inside the same loop, so a long chain of synchronously ready
//! suspensions never deepens the call stack. Only an operation that is
//! genuinely pending makes the task return `Poll::Pending`; its waker then
//! schedules the next poll.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use crate::{
    coroutine::{Coroutine, Resume},
    step::Step,
};

/// Where a task currently is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Waiting to resume the coroutine (not started yet, or a pending
    /// operation has just settled).
    Ready,
    /// Waiting on a pending operation.
    Suspended,
    /// The result has been returned.
    Finished,
}

enum State<C: Coroutine> {
    Ready(Resume<C::Input, C::Error>),
    Suspended(Pin<Box<C::Pending>>),
    Finished,
}

/// Resolves with the coroutine's output or rejects with the first error it
/// does not handle itself.
///
/// Nothing runs until the task is first polled.
pub struct Task<C: Coroutine> {
    coroutine: C,
    state: State<C>,
    resumptions: usize,
}

impl<C: Coroutine> Task<C> {
    pub fn run(coroutine: C) -> Task<C> {
        Task {
            coroutine,
            state: State::Ready(Resume::Start),
            resumptions: 0,
        }
    }

    /// Builds the coroutine from `factory` and `args`, then runs it. The
    /// arguments (including any receiver the caller threads through them)
    /// reach the coroutine unchanged.
    pub fn run_with<A, F>(factory: F, args: A) -> Task<C>
    where
        F: FnOnce(A) -> C,
    {
        Task::run(factory(args))
    }

    pub fn status(&self) -> TaskStatus {
        match self.state {
            State::Ready(_) => TaskStatus::Ready,
            State::Suspended(_) => TaskStatus::Suspended,
            State::Finished => TaskStatus::Finished,
        }
    }

    /// The number of times the coroutine has been resumed so far.
    pub fn resumptions(&self) -> usize {
        self.resumptions
    }

    fn step(&mut self, resume: Resume<C::Input, C::Error>) -> Option<Result<C::Output, C::Error>> {
        match &resume {
            Resume::Start => log::trace!("task: start"),
            Resume::Value(_) => log::trace!("task: resume #{} with value", self.resumptions),
            Resume::Error(_) => log::trace!("task: resume #{} with error", self.resumptions),
        }
        self.resumptions += 1;
        match self.coroutine.resume(resume) {
            Step::Yielded(pending) => {
                log::trace!("task: suspended");
                self.state = State::Suspended(Box::pin(pending));
                None
            }
            Step::Completed(output) => {
                log::trace!("task: completed after {} resumptions", self.resumptions);
                Some(Ok(output))
            }
            Step::Failed(e) => {
                log::trace!("task: failed after {} resumptions", self.resumptions);
                Some(Err(e))
            }
        }
    }
}

// The pending operation is boxed and pinned on its own; nothing else in a
// task is ever pinned.
impl<C: Coroutine> Unpin for Task<C> {}

impl<C: Coroutine> Future for Task<C> {
    type Output = Result<C::Output, C::Error>;

    /// # Panics
    ///
    /// Panics when polled again after returning `Poll::Ready`.
    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        loop {
            match std::mem::replace(&mut this.state, State::Finished) {
                State::Ready(resume) => {
                    if let Some(result) = this.step(resume) {
                        return Poll::Ready(result);
                    }
                }
                State::Suspended(mut pending) => match pending.as_mut().poll(cx) {
                    Poll::Pending => {
                        this.state = State::Suspended(pending);
                        return Poll::Pending;
                    }
                    Poll::Ready(Ok(value)) => this.state = State::Ready(Resume::Value(value)),
                    Poll::Ready(Err(e)) => this.state = State::Ready(Resume::Error(e)),
                },
                State::Finished => panic!("Task polled after completion"),
            }
        }
    }
}

impl<C: Coroutine> std::fmt::Debug for Task<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("status", &self.status())
            .field("resumptions", &self.resumptions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use coseq_common::{Error, ErrorKind};
    use futures::{
        FutureExt,
        future::{self, Ready},
    };

    use super::*;
    use crate::{
        callback::{Callback, CallbackFuture, from_callback},
        coroutine::{BoxPending, from_fn},
    };

    #[derive(Debug, Clone, PartialEq)]
    struct Boom(&'static str);

    type Pending = BoxPending<i64, Boom>;

    fn later(value: i64) -> Pending {
        async move {
            tokio::task::yield_now().await;
            Ok(value)
        }
        .boxed_local()
    }

    fn fail_later(error: &'static str) -> Pending {
        async move {
            tokio::task::yield_now().await;
            Err(Boom(error))
        }
        .boxed_local()
    }

    /// Adds two numbers, then scales the sum by ten, one suspension each.
    struct AddThenScale {
        x: i64,
        y: i64,
        stage: u8,
    }

    impl Coroutine for AddThenScale {
        type Input = i64;
        type Output = i64;
        type Error = Boom;
        type Pending = Pending;

        fn resume(&mut self, resume: Resume<i64, Boom>) -> Step<Pending, i64, Boom> {
            self.stage += 1;
            match (self.stage, resume) {
                (1, Resume::Start) => Step::Yielded(later(self.x + self.y)),
                (2, Resume::Value(sum)) => Step::Yielded(later(sum * 10)),
                (3, Resume::Value(scaled)) => Step::Completed(scaled),
                (_, Resume::Error(e)) => Step::Failed(e),
                _ => Step::Failed(Boom("out of order")),
            }
        }
    }

    #[tokio::test]
    async fn test_computes_through_suspensions() {
        let task = Task::run_with(|(x, y)| AddThenScale { x, y, stage: 0 }, (5, 7));
        assert_eq!(task.status(), TaskStatus::Ready);
        assert_eq!(task.await, Ok(120));
    }

    #[tokio::test]
    async fn test_recovers_from_injected_error() {
        let mut stage = 0;
        let task = Task::run(from_fn(move |resume: Resume<i64, Boom>| -> Step<Pending, i64, Boom> {
            stage += 1;
            match (stage, resume) {
                (1, Resume::Start) => Step::Yielded(fail_later("io")),
                (2, Resume::Error(Boom("io"))) => Step::Completed(-1),
                (_, Resume::Error(e)) => Step::Failed(e),
                _ => Step::Failed(Boom("out of order")),
            }
        }));
        assert_eq!(task.await, Ok(-1));
    }

    #[tokio::test]
    async fn test_uncaught_error_rejects_unchanged() {
        let task = Task::run(from_fn(|resume: Resume<i64, Boom>| -> Step<Pending, i64, Boom> {
            match resume {
                Resume::Start => Step::Yielded(fail_later("disk")),
                Resume::Value(v) => Step::Completed(v),
                Resume::Error(e) => Step::Failed(e),
            }
        }));
        assert_eq!(task.await, Err(Boom("disk")));
    }

    #[tokio::test]
    async fn test_handler_may_raise_a_different_error() {
        let task = Task::run(from_fn(|resume: Resume<i64, Boom>| -> Step<Pending, i64, Boom> {
            match resume {
                Resume::Start => Step::Yielded(fail_later("disk")),
                Resume::Value(v) => Step::Completed(v),
                Resume::Error(_) => Step::Failed(Boom("wrapped")),
            }
        }));
        assert_eq!(task.await, Err(Boom("wrapped")));
    }

    #[tokio::test]
    async fn test_continues_after_catching() {
        let mut recovered = false;
        let task = Task::run(from_fn(move |resume: Resume<i64, Boom>| -> Step<Pending, i64, Boom> {
            match resume {
                Resume::Start => Step::Yielded(fail_later("flaky")),
                Resume::Error(_) if !recovered => {
                    recovered = true;
                    Step::Yielded(later(21))
                }
                Resume::Value(v) => Step::Completed(v * 2),
                Resume::Error(e) => Step::Failed(e),
            }
        }));
        assert_eq!(task.await, Ok(42));
    }

    #[tokio::test]
    async fn test_synchronous_outcomes() {
        let done = Task::run(from_fn(|_: Resume<i64, Boom>| -> Step<Pending, i64, Boom> {
            Step::Completed(7)
        }));
        assert_eq!(done.await, Ok(7));

        let failed = Task::run(from_fn(|_: Resume<i64, Boom>| -> Step<Pending, i64, Boom> {
            Step::Failed(Boom("sync"))
        }));
        assert_eq!(failed.await, Err(Boom("sync")));
    }

    #[tokio::test]
    async fn test_awaits_nested_task() {
        let task = Task::run(from_fn(|resume: Resume<i64, Boom>| -> Step<Pending, i64, Boom> {
            match resume {
                Resume::Start => {
                    let inner = Task::run(AddThenScale { x: 1, y: 2, stage: 0 });
                    Step::Yielded(inner.boxed_local())
                }
                Resume::Value(v) => Step::Completed(v + 1),
                Resume::Error(e) => Step::Failed(e),
            }
        }));
        assert_eq!(task.await, Ok(31));
    }

    #[test]
    fn test_ready_suspensions_do_not_grow_the_stack() {
        const ROUNDS: u64 = 200_000;
        let task = Task::run(from_fn(
            |resume: Resume<u64, Boom>| -> Step<Ready<Result<u64, Boom>>, u64, Boom> {
                match resume {
                    Resume::Start => Step::Yielded(future::ready(Ok(1))),
                    Resume::Value(n) if n < ROUNDS => Step::Yielded(future::ready(Ok(n + 1))),
                    Resume::Value(n) => Step::Completed(n),
                    Resume::Error(e) => Step::Failed(e),
                }
            },
        ));
        assert_eq!(futures::executor::block_on(task), Ok(ROUNDS));
    }

    #[tokio::test]
    async fn test_status_tracks_suspension() {
        let slot: Rc<RefCell<Option<Callback<i64, Error>>>> = Rc::new(RefCell::new(None));
        let stash = slot.clone();
        let mut task = Task::run(from_fn(
            move |resume: Resume<i64, Error>| -> Step<CallbackFuture<i64, Error>, i64, Error> {
                match resume {
                    Resume::Start => {
                        let stash = stash.clone();
                        Step::Yielded(from_callback(move |cb| *stash.borrow_mut() = Some(cb)))
                    }
                    Resume::Value(v) => Step::Completed(v),
                    Resume::Error(e) => Step::Failed(e),
                }
            },
        ));
        assert_eq!(task.status(), TaskStatus::Ready);
        assert!(futures::poll!(&mut task).is_pending());
        assert_eq!(task.status(), TaskStatus::Suspended);
        assert_eq!(task.resumptions(), 1);

        let cb = slot.borrow_mut().take().unwrap();
        cb.ok(9);
        assert_eq!((&mut task).await.unwrap(), 9);
        assert_eq!(task.status(), TaskStatus::Finished);
        assert_eq!(task.resumptions(), 2);
    }

    #[tokio::test]
    async fn test_dropped_callback_is_injected() {
        let task = Task::run(from_fn(
            |resume: Resume<i64, Error>| -> Step<CallbackFuture<i64, Error>, i64, Error> {
                match resume {
                    Resume::Start => Step::Yielded(from_callback(drop)),
                    Resume::Value(v) => Step::Completed(v),
                    Resume::Error(e) if matches!(e.kind(), ErrorKind::CallbackDropped) => {
                        Step::Completed(0)
                    }
                    Resume::Error(e) => Step::Failed(e),
                }
            },
        ));
        assert_eq!(task.await.unwrap(), 0);
    }
}
