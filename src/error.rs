//! Error type shared by the fallible operations of this crate.
//!
//! Most operations are total over their typed inputs and return plain
//! values. Errors arise in two places only:
//!
//! - **Malformed dynamic input**: a [`Value`](crate::value::Value) that is
//!   not an array where a sequence is required.
//! - **Incomparable keys**: a sort key that has no defined ordering with
//!   the other keys (NaN, or mixed dynamic types).
//!
//! Failures of caller-supplied callbacks stay in the caller's own error
//! type, or travel as a [`BoxError`] when they surface asynchronously.

/// Boxed error produced by a deferred task.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for invalid arguments and undefined orderings.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// An argument has the wrong shape, e.g. a non-sequence where a
    /// sequence is required.
    InvalidArgument(String),

    /// Two sort keys have no defined ordering.
    IncomparableKeys {
        /// Index of the first offending element.
        left: usize,
        /// Index of the second offending element.
        right: usize,
    },
}

impl Error {
    pub(crate) fn expected_array(what: &str, found: &str) -> Self {
        Error::InvalidArgument(format!("{what} must be an array, got {found}"))
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Error::IncomparableKeys { left, right } if left == right => {
                write!(f, "sort key of element {left} is not comparable")
            }
            Error::IncomparableKeys { left, right } => {
                write!(f, "sort keys of elements {left} and {right} are not comparable")
            }
        }
    }
}

impl std::error::Error for Error {}
