use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type StdErrorBoxed = Box<dyn std::error::Error + Send + Sync + 'static>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn empty_structure(operation: impl Into<String>) -> Error {
        Error(
            ErrorKind::EmptyStructure {
                operation: operation.into(),
            }
            .into(),
        )
    }

    pub fn index_out_of_bounds(index: usize, len: usize) -> Error {
        Error(ErrorKind::IndexOutOfBounds { index, len }.into())
    }

    pub fn invalid_comparer_spec(spec: impl Into<String>, reason: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidComparerSpec {
                spec: spec.into(),
                reason: reason.into(),
            }
            .into(),
        )
    }

    pub fn sequence_already_consumed() -> Error {
        Error(ErrorKind::SequenceAlreadyConsumed.into())
    }

    pub fn divide_by_empty(operation: impl Into<String>) -> Error {
        Error(
            ErrorKind::DivideByEmpty {
                operation: operation.into(),
            }
            .into(),
        )
    }

    pub fn callback_dropped() -> Error {
        Error(ErrorKind::CallbackDropped.into())
    }

    /// Wraps a foreign error raised inside a visitor, predicate, mapper or
    /// pending operation, for callers that use this `Error` as their failure
    /// type. The source is kept as-is and is reachable through `source()`.
    pub fn propagated<E>(source: E) -> Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error(
            ErrorKind::Propagated {
                source: Box::new(source),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn is_empty_structure(&self) -> bool {
        matches!(self.kind(), ErrorKind::EmptyStructure { .. })
    }

    pub fn is_index_out_of_bounds(&self) -> bool {
        matches!(self.kind(), ErrorKind::IndexOutOfBounds { .. })
    }

    pub fn is_already_consumed(&self) -> bool {
        matches!(self.kind(), ErrorKind::SequenceAlreadyConsumed)
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("{operation} on an empty structure")]
    EmptyStructure { operation: String },

    #[error("index {index} is out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid comparer spec '{spec}': {reason}")]
    InvalidComparerSpec { spec: String, reason: String },

    #[error("one-shot sequence has already been traversed")]
    SequenceAlreadyConsumed,

    #[error("{operation} of an empty sequence")]
    DivideByEmpty { operation: String },

    #[error("callback was dropped before it was invoked")]
    CallbackDropped,

    #[error("{source}")]
    Propagated { source: StdErrorBoxed },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<futures::channel::oneshot::Canceled> for Error {
    fn from(_: futures::channel::oneshot::Canceled) -> Self {
        Error::callback_dropped()
    }
}
