//! Coroutine trampoline.
//!
//! A [`Coroutine`] is a stepwise computation: each call to
//! [`Coroutine::resume`] runs it until it completes, fails, or suspends on a
//! pending operation (any future). A [`Task`] drives a coroutine to its end,
//! feeding the outcome of every pending operation back in: success values
//! resume it, failures are raised at the suspension point so that the
//! coroutine can handle them.
//!
//! ```ignore
//! let task = Task::run(coroutine::from_fn(|resume| match resume {
//!     Resume::Start => Step::Yielded(fetch_price()),
//!     Resume::Value(price) => Step::Completed(price * 2),
//!     Resume::Error(e) => Step::Failed(e),
//! }));
//! let doubled = task.await?;
//! ```

pub mod callback;
pub mod coroutine;
pub mod step;
pub mod task;

pub use callback::{Callback, CallbackFuture, from_callback};
pub use coroutine::{BoxPending, Coroutine, FromFn, Resume, from_fn};
pub use step::Step;
pub use task::{Task, TaskStatus};
