//! Adapts callback-style operations into futures a coroutine can yield.

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use coseq_common::Error;
use futures::channel::oneshot;

/// The completion handle passed to a callback-style operation.
pub struct Callback<T, E> {
    sender: oneshot::Sender<Result<T, E>>,
}

impl<T, E> Callback<T, E> {
    /// Settles the operation. Calling it after the future was dropped is a
    /// no-op.
    pub fn call(self, result: Result<T, E>) {
        if self.sender.send(result).is_err() {
            log::debug!("callback invoked after its future was dropped");
        }
    }

    pub fn ok(self, value: T) {
        self.call(Ok(value))
    }

    pub fn err(self, error: E) {
        self.call(Err(error))
    }
}

impl<T, E> std::fmt::Debug for Callback<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Callback")
    }
}

/// Resolves with whatever the [`Callback`] is called with, or with
/// `CallbackDropped` if it is dropped without being called.
#[must_use = "futures do nothing unless polled"]
pub struct CallbackFuture<T, E> {
    receiver: oneshot::Receiver<Result<T, E>>,
}

/// Starts `operation` right away, handing it a [`Callback`], and returns the
/// future of its result.
pub fn from_callback<T, E, F>(operation: F) -> CallbackFuture<T, E>
where
    F: FnOnce(Callback<T, E>),
    E: From<Error>,
{
    let (sender, receiver) = oneshot::channel();
    operation(Callback { sender });
    CallbackFuture { receiver }
}

impl<T, E: From<Error>> Future for CallbackFuture<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(canceled)) => Poll::Ready(Err(Error::from(canceled).into())),
        }
    }
}
