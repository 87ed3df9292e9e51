//! The result of resolving something that may or may not finish right away.
//!
//! Every engine operation returns `Result<Resolution<T, E>, E>`. The outer
//! `Err` is a synchronous failure. `Ready` is a synchronous success.
//! `Pending` is a future that either fulfills or rejects later.

use std::future::IntoFuture;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::error::Error;

#[must_use = "a resolution carries the outcome, including failures"]
pub enum Resolution<T, E = Error> {
    /// Resolved synchronously.
    Ready(T),
    /// At least one asynchronous thunk is still in flight.
    Pending(LocalBoxFuture<'static, Result<T, E>>),
}

impl<T: 'static, E: 'static> Resolution<T, E> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Resolution::Ready(_))
    }

    /// The value, if resolution finished synchronously.
    ///
    /// A pending resolution is handed back untouched so it can still be
    /// awaited.
    pub fn into_ready(self) -> Result<T, Self> {
        match self {
            Resolution::Ready(value) => Ok(value),
            pending => Err(pending),
        }
    }

    pub fn map<U: 'static>(self, f: impl FnOnce(T) -> U + 'static) -> Resolution<U, E> {
        match self {
            Resolution::Ready(value) => Resolution::Ready(f(value)),
            Resolution::Pending(fut) => {
                Resolution::Pending(fut.map(|result| result.map(f)).boxed_local())
            }
        }
    }

    pub fn map_err<F: 'static>(self, f: impl FnOnce(E) -> F + 'static) -> Resolution<T, F> {
        match self {
            Resolution::Ready(value) => Resolution::Ready(value),
            Resolution::Pending(fut) => {
                Resolution::Pending(fut.map(|result| result.map_err(f)).boxed_local())
            }
        }
    }

    /// Apply a fallible step, keeping sync results sync.
    ///
    /// For `Ready`, a failing `f` surfaces as the outer `Err` right away. For
    /// `Pending`, it becomes the future's rejection.
    pub fn try_map<U: 'static>(
        self,
        f: impl FnOnce(T) -> Result<U, E> + 'static,
    ) -> Result<Resolution<U, E>, E> {
        match self {
            Resolution::Ready(value) => f(value).map(Resolution::Ready),
            Resolution::Pending(fut) => Ok(Resolution::Pending(
                fut.map(|result| result.and_then(f)).boxed_local(),
            )),
        }
    }
}

impl<T: 'static, E: 'static> IntoFuture for Resolution<T, E> {
    type Output = Result<T, E>;
    type IntoFuture = LocalBoxFuture<'static, Result<T, E>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Resolution::Ready(value) => future::ready(Ok(value)).boxed_local(),
            Resolution::Pending(fut) => fut,
        }
    }
}

impl<T, E> std::fmt::Debug for Resolution<T, E>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolution::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Resolution::Pending(_) => f.write_str("Pending"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(value: u32) -> Resolution<u32> {
        Resolution::Pending(async move { Ok(value) }.boxed_local())
    }

    #[test]
    fn ready_stays_ready_through_map() {
        let res: Resolution<u32> = Resolution::Ready(2);
        let mapped = res.map(|n| n * 10);
        assert_eq!(mapped.into_ready().unwrap(), 20);
    }

    #[test]
    fn try_map_fails_synchronously_when_ready() {
        let res: Resolution<u32> = Resolution::Ready(0);
        let err = res.try_map(|_| Err::<u32, _>(Error::NoActions)).unwrap_err();
        assert!(matches!(err, Error::NoActions));
    }

    #[test]
    fn pending_is_not_ready() {
        let res = pending(1);
        assert!(!res.is_ready());
        assert!(res.into_ready().is_err());
    }

    #[tokio::test]
    async fn try_map_rejects_when_pending() {
        let res = pending(0)
            .try_map(|_| Err::<u32, _>(Error::NoActions))
            .unwrap();
        let err = res.await.unwrap_err();
        assert!(matches!(err, Error::NoActions));
    }

    #[tokio::test]
    async fn ready_and_pending_both_await() {
        assert_eq!(Resolution::<u32>::Ready(7).await.unwrap(), 7);
        assert_eq!(pending(8).map(|n| n + 1).await.unwrap(), 9);
    }
}
