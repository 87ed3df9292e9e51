//! Error types for action-capture.
//!
//! Two channels are kept apart. [`Error`] is structural: a thunk failed or
//! nothing was dispatched. [`CaptureError::Action`] is a domain failure: the
//! last captured action was flagged as an error and its payload is handed
//! back as the failure value.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no actions were dispatched")]
    NoActions,

    #[error(transparent)]
    Producer(anyhow::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Wrap a thunk failure.
    ///
    /// A thunk that propagated an engine error with `?` gets that error back
    /// unchanged instead of a nested `Producer`.
    pub fn from_producer(err: anyhow::Error) -> Self {
        err.downcast::<Error>().unwrap_or_else(Error::Producer)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure returned by [`capture`](crate::engine::capture).
#[derive(Debug)]
pub enum CaptureError<P> {
    /// The last action had its error flag set. Carries its payload.
    Action(P),
    Capture(Error),
}

impl<P> CaptureError<P> {
    /// The error payload, if this is a domain failure.
    pub fn into_payload(self) -> Option<P> {
        match self {
            CaptureError::Action(payload) => Some(payload),
            CaptureError::Capture(_) => None,
        }
    }
}

impl<P> From<Error> for CaptureError<P> {
    fn from(err: Error) -> Self {
        CaptureError::Capture(err)
    }
}

impl<P> fmt::Display for CaptureError<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::Action(_) => write!(f, "last action was an error"),
            CaptureError::Capture(_) => write!(f, "capture failed"),
        }
    }
}

impl<P: fmt::Debug> std::error::Error for CaptureError<P> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CaptureError::Action(_) => None,
            CaptureError::Capture(err) => Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_producer_unwraps_engine_errors() {
        let err = Error::from_producer(anyhow::Error::new(Error::NoActions));
        assert!(matches!(err, Error::NoActions));
    }

    #[test]
    fn from_producer_wraps_foreign_errors() {
        let err = Error::from_producer(anyhow::anyhow!("boom"));
        match err {
            Error::Producer(inner) => assert_eq!(inner.to_string(), "boom"),
            other => panic!("expected Producer, got {other:?}"),
        }
    }
}
