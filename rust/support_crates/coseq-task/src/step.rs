/// The outcome of resuming a coroutine once.
///
/// `Yielded` carries the pending operation the coroutine is now waiting on;
/// `Completed` and `Failed` end the computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step<P, O, E> {
    Yielded(P),
    Completed(O),
    Failed(E),
}

impl<P, O, E> Step<P, O, E> {
    #[inline]
    pub const fn is_yielded(&self) -> bool {
        matches!(self, Step::Yielded(_))
    }

    #[inline]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Step::Completed(_))
    }

    #[inline]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Step::Failed(_))
    }

    /// Maps the pending operation, leaving terminal steps untouched.
    pub fn map_yielded<Q, F>(self, f: F) -> Step<Q, O, E>
    where
        F: FnOnce(P) -> Q,
    {
        match self {
            Step::Yielded(p) => Step::Yielded(f(p)),
            Step::Completed(o) => Step::Completed(o),
            Step::Failed(e) => Step::Failed(e),
        }
    }

    /// Returns the final result, or `None` if the step suspended.
    pub fn into_result(self) -> Option<Result<O, E>> {
        match self {
            Step::Yielded(_) => None,
            Step::Completed(o) => Some(Ok(o)),
            Step::Failed(e) => Some(Err(e)),
        }
    }
}

/// Ends the computation with the result: `Ok` completes, `Err` fails.
impl<P, O, E> From<Result<O, E>> for Step<P, O, E> {
    fn from(result: Result<O, E>) -> Self {
        match result {
            Ok(o) => Step::Completed(o),
            Err(e) => Step::Failed(e),
        }
    }
}
